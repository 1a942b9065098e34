pub mod masking;
pub mod writer;

pub use masking::{collect_secrets, mask_email, mask_emails_in_text, mask_secrets, mask_value};
pub use writer::MaskingMakeWriter;
