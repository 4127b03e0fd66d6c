use url::Url;

const DIRECT_IMAGE_HOST: &str = "i.imgur.com";
const RASTER_EXTENSIONS: [&str; 4] = [".jpg", ".jpeg", ".png", ".gif"];

/// Rewrites an imgur page URL into the direct image URL served from
/// `i.imgur.com`. Gallery paths lose their `/gallery` segment, bare content
/// ids gain a `.jpg` extension, and URLs that already point at a direct
/// image pass through untouched. Anything that is not an http(s) URL (local
/// resource references included) is returned unchanged; the function never
/// fails and is idempotent.
pub fn to_direct_image_url(raw: &str) -> String {
    let Ok(parsed) = Url::parse(raw) else {
        return raw.to_string();
    };
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return raw.to_string();
    }

    let path = parsed.path();
    let clean = match path.strip_prefix("/gallery/") {
        Some(rest) => format!("/{rest}"),
        None => path.to_string(),
    };

    if has_raster_extension(&clean) {
        if parsed.host_str() == Some(DIRECT_IMAGE_HOST) && clean == path {
            return raw.to_string();
        }
        return format!("https://{DIRECT_IMAGE_HOST}{clean}");
    }

    format!("https://{DIRECT_IMAGE_HOST}{clean}.jpg")
}

fn has_raster_extension(path: &str) -> bool {
    let lowered = path.to_ascii_lowercase();
    RASTER_EXTENSIONS.iter().any(|ext| lowered.ends_with(ext))
}
