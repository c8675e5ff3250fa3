use axum::response::Html;

/// Shared page shell; the site is a handful of server-rendered pages, so a
/// template engine would be overkill.
pub(crate) fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} - Vidox</title>
</head>
<body>
<nav><a href="/">Home</a> | <a href="/about">About</a> | <a href="/contact">Contact</a></nav>
{body}</body>
</html>
"#
    )
}

pub(crate) fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// GET /
pub async fn index_page() -> Html<String> {
    let body = r#"<h1>Vidox</h1>
<p>Paste a media URL to download the video, or extract just the audio track.</p>
<h2>Video</h2>
<form action="/download/video" method="get">
  <input type="url" name="url" placeholder="https://..." size="60" required>
  <select name="quality">
    <option value="best">Best available</option>
    <option value="1080p">1080p</option>
    <option value="720p">720p</option>
    <option value="480p">480p</option>
    <option value="360p">360p</option>
  </select>
  <button type="submit">Download video</button>
</form>
<h2>Audio</h2>
<form action="/download/audio" method="get">
  <input type="url" name="url" placeholder="https://..." size="60" required>
  <button type="submit">Download MP3</button>
</form>
"#;
    Html(layout("Home", body))
}

/// GET /about
pub async fn about_page() -> Html<String> {
    let body = r#"<h1>About</h1>
<p>Vidox is a small self-hosted front-end for downloading media from the web.
Submit a link on the home page and the server fetches the video for you, or
converts it to an MP3 when you only want the audio.</p>
<p>Downloads are prepared on the server and streamed back as file
attachments; nothing is kept around once your download finishes.</p>
"#;
    Html(layout("About", body))
}
