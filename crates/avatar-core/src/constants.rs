//! Constants shared across avatar crates.

/// Name of the single-file media collection holding the avatar.
pub const AVATAR_COLLECTION: &str = "avatar";

/// Multipart field carrying the uploaded image.
pub const AVATAR_FIELD: &str = "avatar";

/// Default maximum upload size in kilobytes.
pub const DEFAULT_MAX_UPLOAD_KB: usize = 2048;

/// Variant served when the display layer does not ask for a specific one.
pub const DEFAULT_DISPLAY_VARIANT: &str = "80x80";

/// Filename and content type produced by the client-side crop.
pub const CROPPED_FILENAME: &str = "avatar.png";
pub const CROPPED_CONTENT_TYPE: &str = "image/png";

/// Default placeholder service.
pub const DEFAULT_PLACEHOLDER_BASE_URL: &str = "https://ui-avatars.com/api/";

/// Default upper bound for synchronous variant generation.
pub const DEFAULT_CONVERSION_TIMEOUT_SECS: u64 = 10;

/// Raster types accepted for upload unless overridden by configuration.
pub const DEFAULT_ALLOWED_CONTENT_TYPES: &[&str] = &[
    "image/png",
    "image/jpeg",
    "image/gif",
    "image/webp",
    "image/bmp",
];

/// Headers the upstream session layer uses to forward the authenticated account.
pub const OWNER_ID_HEADER: &str = "x-owner-id";
pub const OWNER_NAME_HEADER: &str = "x-owner-name";

/// Largest width or height accepted for an uploaded or decoded image.
pub const MAX_IMAGE_DIMENSION: u32 = 8192;

/// Upper bound on memory the decoder may allocate for one image.
pub const MAX_DECODE_ALLOC_BYTES: u64 = 512 * 1024 * 1024;
