pub mod download;
pub mod upload;

pub use download::download_body;
pub use upload::upload_body;
