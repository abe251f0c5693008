pub mod build_status;
pub mod index_checksum;
pub mod page_number;

pub use build_status::BuildStatus;
pub use index_checksum::IndexChecksum;
pub use page_number::PageNumber;
