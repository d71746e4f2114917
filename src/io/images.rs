use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use regex::Regex;

use crate::provider::runner::{CommandRunner, os_args};

static DATA_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^data:image/(png|jpeg|jpg|gif|webp);base64,(.+)$").expect("valid regex")
});

/// Clipboard readers tried in order (Wayland, then X11)
const CLIPBOARD_COMMANDS: &[(&str, &[&str])] = &[
    ("wl-paste", &["--type", "image/png", "--no-newline"]),
    ("xclip", &["-selection", "clipboard", "-t", "image/png", "-o"]),
];

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("unsupported image data")]
    Unsupported,
    #[error("invalid base64 image data: {0}")]
    Decode(#[from] base64::DecodeError),
    #[error("could not save image: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PastedImage {
    pub bytes: Vec<u8>,
    pub extension: String,
}

/// Whether pasted text should be treated as an image rather than inserted
pub fn is_image_data_url(text: &str) -> bool {
    text.starts_with("data:image/")
}

/// Decode `data:image/<png|jpeg|jpg|gif|webp>;base64,<data>`. `jpeg` is saved as `jpg`.
pub fn decode_data_url(text: &str) -> Result<PastedImage, ImageError> {
    let caps = DATA_URL.captures(text.trim()).ok_or(ImageError::Unsupported)?;
    let extension = match &caps[1] {
        "jpeg" => "jpg",
        other => other,
    };
    Ok(PastedImage {
        bytes: STANDARD.decode(caps[2].as_bytes())?,
        extension: extension.to_string(),
    })
}

/// PNG data from the system clipboard, if any reader is installed and has an image
pub fn read_clipboard_image(runner: &dyn CommandRunner) -> Option<PastedImage> {
    CLIPBOARD_COMMANDS.iter().find_map(|(program, args)| {
        let output = runner.run(program, &os_args(args.iter().copied()), None).ok()?;
        if !output.status.success() || output.stdout.is_empty() {
            tracing::debug!(program, "no clipboard image");
            return None;
        }
        Some(PastedImage {
            bytes: output.stdout,
            extension: "png".to_string(),
        })
    })
}

/// Write the image to `images_dir/paste-<millis>.<ext>` and return its path
/// relative to `root`
pub fn save_image(
    root: &Path,
    images_dir: &Path,
    image: &PastedImage,
    millis: i64,
) -> Result<String, ImageError> {
    fs::create_dir_all(images_dir)?;
    let path = images_dir.join(format!("paste-{}.{}", millis, image.extension));
    fs::write(&path, &image.bytes)?;
    let relative = path.strip_prefix(root).unwrap_or(&path);
    Ok(relative.display().to_string())
}

/// Markdown inserted into the text field for a saved image
pub fn image_markdown(relative_path: &str) -> String {
    format!("\n![image]({})\n", relative_path)
}
