// src/web/page.rs
//! The editor page: form on the left, live preview on the right.

use crate::render::svg::escape_xml;
use crate::render::template::EXPORT_BUTTON_LABEL;
use crate::types::{CvField, CvRecord, InputKind};

const SCRIPT: &str = r#"
const preview = document.getElementById('preview');
const refresh = () => { preview.src = '/api/cv/preview.svg?t=' + Date.now(); };

async function failIfError(response) {
  if (!response.ok || (response.headers.get('Content-Type') || '').includes('json')) {
    const body = await response.json().catch(() => ({}));
    if (body.success === false) { throw new Error(body.error); }
  }
  return response;
}

document.querySelectorAll('[data-field]').forEach((input) => {
  input.addEventListener('input', async () => {
    await fetch('/api/cv/field', {
      method: 'POST',
      headers: { 'Content-Type': 'application/json' },
      body: JSON.stringify({ field: input.dataset.field, value: input.value }),
    }).then(failIfError).then(refresh).catch((e) => console.error(e));
  });
});

document.getElementById('photo').addEventListener('change', async (event) => {
  const file = event.target.files[0];
  if (!file) { return; }
  const body = new FormData();
  body.append('file', file);
  await fetch('/api/cv/photo', { method: 'POST', body })
    .then(failIfError).then(refresh).catch((e) => alert(e.message));
});

function downloadName(disposition) {
  const extended = disposition.match(/filename\*=UTF-8''([^;]+)/i);
  if (extended) {
    try { return decodeURIComponent(extended[1]); } catch (e) { /* use the plain name */ }
  }
  const plain = disposition.match(/filename="([^"]+)"/);
  return plain ? plain[1] : 'cv.pdf';
}

document.getElementById('export').addEventListener('click', async () => {
  try {
    const response = await fetch('/api/cv/export', { method: 'POST' });
    if (response.status === 204) { return; }
    if (!(response.headers.get('Content-Type') || '').includes('pdf')) {
      const body = await response.json();
      throw new Error(body.error);
    }
    const link = document.createElement('a');
    link.href = URL.createObjectURL(await response.blob());
    link.download = downloadName(response.headers.get('Content-Disposition') || '');
    link.click();
    URL.revokeObjectURL(link.href);
  } catch (e) {
    alert(e.message || 'Failed to generate PDF');
  }
});
"#;

const STYLE: &str = "body{font-family:Helvetica,Arial,sans-serif;margin:0;display:flex;gap:24px;background:#f3f4f6}\
form{width:360px;padding:24px;background:#fff;display:flex;flex-direction:column;gap:12px}\
label{font-size:14px;font-weight:bold;color:#374151}\
input,textarea{width:100%;box-sizing:border-box;padding:8px;border:1px solid #d1d5db;border-radius:6px}\
textarea{min-height:96px}\
.required{color:#dc2626}\
main{flex:1;padding:24px}\
#preview{width:794px;background:#fff;box-shadow:0 1px 4px rgba(0,0,0,.2)}\
#export{margin-bottom:12px;padding:8px 16px;border:0;border-radius:8px;background:#2563eb;color:#fff;font-weight:bold}";

fn field_input(field: CvField, value: &str) -> String {
    let name = field.as_str();
    let placeholder = escape_xml(field.placeholder());
    let required = if field.is_required() { " required" } else { "" };
    let value = escape_xml(value);
    match field.input_kind() {
        InputKind::TextArea => format!(
            "<textarea id=\"{name}\" data-field=\"{name}\" placeholder=\"{placeholder}\"{required}>{value}</textarea>"
        ),
        InputKind::File => {
            "<input id=\"photo\" type=\"file\" accept=\"image/*\">".to_string()
        }
        kind => {
            let input_type = match kind {
                InputKind::Email => "email",
                InputKind::Tel => "tel",
                InputKind::Url => "url",
                _ => "text",
            };
            format!(
                "<input id=\"{name}\" type=\"{input_type}\" data-field=\"{name}\" placeholder=\"{placeholder}\" value=\"{value}\"{required}>"
            )
        }
    }
}

/// Full editor page, pre-filled with the current record.
pub fn index_html(record: &CvRecord) -> String {
    let mut form = String::new();
    for field in CvField::ALL {
        let marker = if field.is_required() {
            " <span class=\"required\">*</span>"
        } else {
            ""
        };
        form.push_str(&format!(
            "<div><label for=\"{}\">{}{}</label>{}</div>\n",
            if field == CvField::Image { "photo" } else { field.as_str() },
            escape_xml(field.label()),
            marker,
            field_input(field, record.get(field))
        ));
    }

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>CV Builder</title>\n<style>{STYLE}</style>\n</head>\n<body>\n<form onsubmit=\"return false\">\n{form}</form>\n<main>\n<button id=\"export\" type=\"button\">{}</button>\n<div><img id=\"preview\" src=\"/api/cv/preview.svg\" alt=\"CV preview\"></div>\n</main>\n<script>{SCRIPT}</script>\n</body>\n</html>\n",
        EXPORT_BUTTON_LABEL
    )
}
