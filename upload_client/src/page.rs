use base64::{engine::general_purpose::STANDARD, Engine};
use std::fmt::Write;

pub const ACCEPTED_FORMATS: &str = "image/jpeg,image/png,.jpg,.jpeg,.png";

/// What the result area shows after a submit.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Prediction {
        region: String,
        code: String,
        confidence: String,
    },
    ServiceFailure,
    RequestError(String),
    NoFileChosen,
    BadUpload(String),
}

/// The uploaded image echoed back inline.
#[derive(Debug, Clone)]
pub struct Preview {
    pub content_type: String,
    pub data: Vec<u8>,
}

pub fn format_confidence(confidence: f32) -> String {
    format!("{:.2}%", f64::from(confidence) * 100.0)
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

const HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Indian Number Plate Classifier</title>
<style>
body { margin: 0; min-height: 100vh; font-family: sans-serif; color: #fff;
       background: linear-gradient(rgba(0,0,0,.5), rgba(0,0,0,.5)), #1f2a36; }
main { max-width: 44rem; margin: 0 auto; padding: 2rem 1rem; }
.notice { padding: .75rem 1rem; border-radius: .4rem; margin-top: 1rem; }
.success { background: rgba(33,150,83,.35); }
.error { background: rgba(200,40,40,.4); }
.info { background: rgba(60,120,200,.35); }
figure img { max-width: 100%; border-radius: .4rem; }
#waiting[hidden] { display: none; }
</style>
</head>
<body>
<main>
<h1>Indian Number Plate Classifier</h1>
<p>Upload a number plate image (any format), and it will predict the state of registration.</p>
"#;

const TAIL: &str = "</main>\n</body>\n</html>\n";

fn render_form(html: &mut String) {
    let _ = write!(
        html,
        r#"<form method="post" action="/" enctype="multipart/form-data"
      onsubmit="document.getElementById('waiting').hidden = false; this.querySelector('button').disabled = true;">
<label for="file">Choose an image...</label>
<input id="file" name="file" type="file" accept="{ACCEPTED_FORMATS}">
<button type="submit">Predict</button>
</form>
<p id="waiting" class="notice info" hidden>Sending image to model...</p>
"#
    );
}

fn render_preview(html: &mut String, preview: &Preview) {
    let _ = write!(
        html,
        r#"<figure><img src="data:{};base64,{}" alt="Uploaded Image"><figcaption>Uploaded Image</figcaption></figure>
"#,
        escape_html(&preview.content_type),
        STANDARD.encode(&preview.data)
    );
}

fn render_notice(html: &mut String, notice: &Notice) {
    let (class, message) = match notice {
        Notice::Prediction {
            region,
            code,
            confidence,
        } => (
            "success",
            format!(
                "The model predicts that this number plate is registered in <strong>{}</strong> ({}) with a confidence level of {}.",
                escape_html(region),
                escape_html(code),
                escape_html(confidence)
            ),
        ),
        Notice::ServiceFailure => ("error", "Prediction failed. Please try again.".to_string()),
        Notice::RequestError(message) => {
            ("error", format!("Request error: {}", escape_html(message)))
        }
        Notice::NoFileChosen => ("info", "Please choose an image to upload.".to_string()),
        Notice::BadUpload(message) => (
            "error",
            format!("Could not read the upload: {}", escape_html(message)),
        ),
    };
    let _ = writeln!(html, r#"<p class="notice {}">{}</p>"#, class, message);
}

pub fn render(preview: Option<&Preview>, notice: Option<&Notice>) -> String {
    let mut html = String::from(HEAD);
    render_form(&mut html);
    if let Some(preview) = preview {
        render_preview(&mut html, preview);
    }
    if let Some(notice) = notice {
        render_notice(&mut html, notice);
    }
    html.push_str(TAIL);
    html
}
