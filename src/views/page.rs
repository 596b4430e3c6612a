//! Server-rendered file browser page.
//!
//! Rows carry `data-key` / `data-note` attributes so the inline script can
//! filter as the user types and patch a row after a note is saved, without
//! another round trip for the listing.

use crate::{
    models::file::{FileDescriptor, ListingOutcome},
    state::Settings,
};

const SIZE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Human-readable size in base 1024, at most two decimals, trailing zeros dropped.
pub fn format_bytes(bytes: i64) -> String {
    if bytes <= 0 {
        return "0 B".into();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = format!("{:.2}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, SIZE_UNITS[unit])
}

pub fn html_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn render_row(file: &FileDescriptor) -> String {
    let key = html_escape(&file.key);
    let note = html_escape(file.note.as_deref().unwrap_or(""));
    let modified = file
        .last_modified
        .map(|ts| ts.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "unknown date".into());
    let chip_hidden = if file.note.is_some() { "" } else { " hidden" };

    format!(
        concat!(
            r#"<li class="file" data-key="{key}" data-note="{note}">"#,
            r#"<a class="file-link" href="{url}" target="_blank" rel="noopener">"#,
            r#"<span class="file-key">{key}</span>"#,
            r#"<span class="chip"{chip_hidden}>{note}</span>"#,
            r#"<span class="file-meta">{size} · {modified}</span>"#,
            r#"</a>"#,
            r#"<button class="edit" type="button" title="Edit note">✎</button>"#,
            r#"</li>"#
        ),
        key = key,
        note = note,
        url = html_escape(&file.url),
        chip_hidden = chip_hidden,
        size = format_bytes(file.size),
        modified = modified,
    )
}

/// Full browser page for a successful listing.
pub fn render_page(settings: &Settings, files: &[FileDescriptor]) -> String {
    let rows: String = files.iter().map(render_row).collect();
    let title = html_escape(&settings.site_title);

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>{style}</style>
</head>
<body>
<header class="bar">
  <span class="title">{title}</span>
  <span class="chip count" id="count">{count} files</span>
</header>
<main>
  <input id="search" type="search" placeholder="Search files or notes..." autocomplete="off">
  <ul id="files">{rows}</ul>
  <p id="empty" class="empty"{empty_hidden}>No matching files</p>
</main>
<dialog id="editor">
  <form method="dialog">
    <h2>Edit note</h2>
    <p id="editor-key" class="editor-key"></p>
    <textarea id="editor-note" rows="3" placeholder="Note"></textarea>
    <menu>
      <button value="cancel" formnovalidate>Cancel</button>
      <button id="save" type="button">Save</button>
    </menu>
  </form>
</dialog>
<script>{script}</script>
</body>
</html>
"##,
        title = title,
        style = style(&settings.accent_color),
        count = files.len(),
        rows = rows,
        empty_hidden = if files.is_empty() { "" } else { " hidden" },
        script = SCRIPT,
    )
}

/// Page shown when the bucket cannot be listed.
pub fn render_error_page(settings: &Settings, outcome: &ListingOutcome) -> String {
    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>{title}</title></head>
<body style="padding:40px;color:#b00020;font-family:monospace">
<h1>Could not connect to the object store</h1>
<p><strong>Error:</strong> {message}</p>
<div style="background:#fff0f0;padding:20px;border-radius:8px;margin-top:20px">
<h3>Things to check</h3>
<ul>
<li>Is the account id or endpoint correct? An R2 account id is the bare id, not a URL.</li>
<li>Is the bucket name spelled correctly?</li>
<li>Do the access keys have permission to list and read the bucket?</li>
</ul>
<pre style="margin-top:10px;color:#666;white-space:pre-wrap">{diagnostic}</pre>
</div>
</body>
</html>
"##,
        title = html_escape(&settings.site_title),
        message = html_escape(outcome.message.as_deref().unwrap_or("unknown error")),
        diagnostic = html_escape(outcome.diagnostic.as_deref().unwrap_or("")),
    )
}

fn style(accent: &str) -> String {
    let accent = html_escape(accent);
    format!(
        r#"
:root {{ --accent: {accent}; }}
body {{ margin: 0; font-family: system-ui, sans-serif; background: #f7f9fc; color: #1a1a1a; }}
.bar {{ position: sticky; top: 0; display: flex; align-items: center; gap: 12px; padding: 14px 24px;
  background: rgba(255,255,255,0.9); backdrop-filter: blur(10px); border-bottom: 1px solid #e0e0e0; }}
.title {{ flex: 1; font-weight: 600; font-size: 1.2rem; color: var(--accent); }}
main {{ max-width: 860px; margin: 32px auto; padding: 0 16px; }}
#search {{ width: 100%; box-sizing: border-box; padding: 12px 20px; border-radius: 50px;
  border: 1px solid #e0e0e0; font-size: 1rem; margin-bottom: 24px; }}
#files {{ list-style: none; margin: 0; padding: 0; background: #fff; border: 1px solid #eee; border-radius: 16px; overflow: hidden; }}
.file {{ display: flex; align-items: center; border-bottom: 1px solid #f0f0f0; }}
.file:last-child {{ border-bottom: none; }}
.file:hover {{ background: #f5f9ff; }}
.file-link {{ flex: 1; display: flex; flex-wrap: wrap; gap: 8px; align-items: center; padding: 16px;
  color: inherit; text-decoration: none; word-break: break-all; }}
.file-key {{ font-weight: 500; }}
.file-meta {{ flex-basis: 100%; font-size: 0.85rem; color: #666; }}
.chip {{ background: var(--accent); color: #fff; border-radius: 4px; padding: 1px 8px; font-size: 0.75rem; }}
.chip.count {{ background: #e0e0e0; color: #333; border-radius: 12px; }}
.edit {{ border: none; background: none; font-size: 1.2rem; color: #666; cursor: pointer; padding: 16px; }}
.empty {{ text-align: center; color: #666; padding: 32px; }}
dialog {{ border: none; border-radius: 12px; width: min(420px, 90vw); }}
.editor-key {{ color: #666; word-break: break-all; }}
textarea {{ width: 100%; box-sizing: border-box; font: inherit; padding: 8px; }}
menu {{ display: flex; justify-content: flex-end; gap: 8px; padding: 0; }}
#save {{ background: var(--accent); color: #fff; border: none; border-radius: 16px; padding: 6px 16px; }}
#save:disabled {{ opacity: 0.6; }}
"#
    )
}

const SCRIPT: &str = r#"
(function () {
  const search = document.getElementById('search');
  const rows = Array.from(document.querySelectorAll('#files .file'));
  const count = document.getElementById('count');
  const empty = document.getElementById('empty');
  const editor = document.getElementById('editor');
  const editorKey = document.getElementById('editor-key');
  const editorNote = document.getElementById('editor-note');
  const save = document.getElementById('save');
  let editing = null;

  function applyFilter() {
    const needle = search.value.toLowerCase();
    let visible = 0;
    for (const row of rows) {
      const hit = !needle
        || row.dataset.key.toLowerCase().includes(needle)
        || row.dataset.note.toLowerCase().includes(needle);
      row.hidden = !hit;
      if (hit) visible += 1;
    }
    count.textContent = visible + ' files';
    empty.hidden = visible !== 0;
  }

  search.addEventListener('input', applyFilter);

  for (const row of rows) {
    row.querySelector('.edit').addEventListener('click', function (e) {
      e.preventDefault();
      editing = row;
      editorKey.textContent = row.dataset.key;
      editorNote.value = row.dataset.note;
      editor.showModal();
    });
  }

  save.addEventListener('click', async function () {
    if (!editing) return;
    const row = editing;
    const note = editorNote.value;
    const path = row.dataset.key.split('/').map(encodeURIComponent).join('/');
    save.disabled = true;
    save.textContent = 'Saving...';
    try {
      const res = await fetch('/api/notes/' + path, {
        method: 'PUT',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify({ note: note }),
      });
      if (!res.ok) throw new Error('save failed');
      const cleared = note.trim() === '';
      row.dataset.note = cleared ? '' : note;
      const chip = row.querySelector('.chip');
      chip.textContent = cleared ? '' : note;
      chip.hidden = cleared;
      editing = null;
      editor.close();
      applyFilter();
    } catch (err) {
      alert('Failed to save note');
    } finally {
      save.disabled = false;
      save.textContent = 'Save';
    }
  });
})();
"#;
