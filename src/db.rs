pub mod catalogo_repo;
pub use catalogo_repo::CatalogoRepository;
pub mod estoque_repo;
pub use estoque_repo::EstoqueRepository;
pub mod producao_repo;
pub use producao_repo::ProducaoRepository;
pub mod user_repo;
pub use user_repo::UserRepository;
