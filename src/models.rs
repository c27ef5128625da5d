pub mod auth;
pub mod catalogo;
pub mod dashboard;
pub mod estoque;
pub mod producao;
