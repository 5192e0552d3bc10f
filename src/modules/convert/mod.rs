pub mod converter;
pub mod converter_soffice;
pub mod handle;
pub mod model;
pub mod packager;
pub mod route;
pub mod schema;
pub mod service;
pub mod validator;
pub mod workspace;

pub use converter_soffice::SofficeConverter;
pub use model::ConvertConfig;
pub use service::ConvertService;
