pub mod download_file;
pub mod upload_file;

pub use download_file::{
    DownloadFileOperation, DownloadFileOperationOutcome, DownloadFileOperationResult,
};
pub use upload_file::{UploadFileOperation, UploadFileOperationRequest, UploadFileOperationResult};
