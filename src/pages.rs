//! Server-rendered HTML for the dynamic pages.

/// Escapes text for interpolation into HTML bodies and attribute values.
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Success page rendered after an upload, linking the stored file and the
/// next actions.
pub fn upload_success(stored_name: &str) -> String {
    let name = escape_html(stored_name);
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Upload complete</title></head>
<body>
  <h1>File uploaded</h1>
  <p>Stored as <a href="/uploads/{name}">{name}</a></p>
  <p>
    <a href="/">Upload another</a> |
    <a href="/list">View files</a> |
    <a href="/logout">Logout</a>
  </p>
</body>
</html>
"#
    )
}

/// File listing page: one row per stored file with a download link and a
/// delete action wired to the delete route.
pub fn file_list(names: &[String]) -> String {
    let mut rows = String::new();
    for name in names {
        let name = escape_html(name);
        rows.push_str(&format!(
            r#"    <li><a href="/uploads/{name}">{name}</a> <button data-name="{name}">Delete</button></li>
"#
        ));
    }
    let body = if rows.is_empty() {
        "  <p>No files uploaded yet.</p>\n".to_string()
    } else {
        format!("  <ul>\n{rows}  </ul>\n")
    };
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Files</title></head>
<body>
  <h1>Uploaded files</h1>
{body}  <p><a href="/">Upload</a> | <a href="/logout">Logout</a></p>
  <script>
    document.querySelectorAll('button[data-name]').forEach(function (button) {{
      button.addEventListener('click', function () {{
        fetch('/delete/' + encodeURIComponent(button.dataset.name), {{ method: 'DELETE' }})
          .then(function () {{ window.location.reload(); }});
      }});
    }});
  </script>
</body>
</html>
"#
    )
}

/// Inline error snippet rendered when login fails.
pub fn login_failed() -> String {
    r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Login failed</title></head>
<body>
  <p>Invalid username or password.</p>
  <p><a href="/login">Try again</a></p>
</body>
</html>
"#
    .to_string()
}
