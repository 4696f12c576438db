pub mod create_blob;
pub mod delete_blob;
pub mod read_blobs;
pub mod update_blob;

pub use create_blob::{
    CreateBlobOperation, CreateBlobOperationOutcome, CreateBlobOperationRequest,
    CreateBlobOperationResult,
};
pub use delete_blob::{
    DeleteBlobOperation, DeleteBlobOperationOutcome, DeleteBlobOperationRequest,
};
pub use read_blobs::{
    ReadAction, ReadBlobsOperation, ReadBlobsOperationOutcome, ReadBlobsOperationRequest,
};
pub use update_blob::{
    UpdateBlobOperation, UpdateBlobOperationOutcome, UpdateBlobOperationRequest,
    UpdateBlobOperationResult,
};
