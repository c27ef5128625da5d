pub mod auth;
pub mod catalogo_service;
pub mod dashboard_service;
pub mod estoque_service;
pub mod producao_service;
pub mod unidades;
