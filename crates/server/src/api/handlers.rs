mod admin;
mod contact;
mod download;
mod pages;

// Re-export all handlers
pub use admin::{
    admin_overview, export_messages, list_messages, mark_handled, AdminOverview, MarkHandledRequest,
};
pub use contact::{contact_page, submit_contact, ContactSubmission};
pub use download::{download_audio, download_video, DownloadParams};
pub use pages::{about_page, index_page};
