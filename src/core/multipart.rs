use std::collections::HashMap;

pub struct UploadedFile {
    pub filename: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

#[derive(Default)]
pub struct MultipartForm {
    pub fields: HashMap<String, String>,
    pub files: HashMap<String, UploadedFile>,
}

/// Extract the boundary parameter from a multipart/form-data content type.
pub fn boundary_from_content_type(content_type: &str) -> Option<String> {
    if !content_type.starts_with("multipart/form-data") {
        return None;
    }
    content_type
        .split(';')
        .map(str::trim)
        .find_map(|param| param.strip_prefix("boundary="))
        .map(|b| b.trim_matches('"').to_string())
        .filter(|b| !b.is_empty())
}

/// Parse a multipart/form-data body into text fields and uploaded files.
///
/// Parts with a filename in their Content-Disposition become files, the rest
/// become text fields. Malformed parts are skipped rather than failing the
/// whole form.
pub fn parse_multipart(boundary: &str, body: &[u8]) -> MultipartForm {
    let delimiter = format!("--{}", boundary).into_bytes();
    let mut form = MultipartForm::default();

    // The first section is the preamble, the section starting with "--" is
    // the closing delimiter; both carry no part data.
    for section in split_on(body, &delimiter).into_iter().skip(1) {
        if section.starts_with(b"--") {
            break;
        }
        let part = strip_crlf(section);
        let Some(split_at) = find_subslice(part, b"\r\n\r\n") else {
            continue;
        };
        let headers = String::from_utf8_lossy(&part[..split_at]);
        let data = strip_trailing_crlf(&part[split_at + 4..]);

        let mut name = None;
        let mut filename = None;
        let mut content_type = None;
        for line in headers.lines() {
            let lower = line.to_ascii_lowercase();
            if lower.starts_with("content-disposition:") {
                name = disposition_param(line, "name");
                filename = disposition_param(line, "filename");
            } else if let Some(value) = lower.strip_prefix("content-type:") {
                content_type = Some(value.trim().to_string());
            }
        }

        let Some(name) = name else { continue };
        match filename {
            Some(filename) => {
                form.files.insert(
                    name,
                    UploadedFile {
                        filename,
                        content_type,
                        data: data.to_vec(),
                    },
                );
            }
            None => {
                form.fields
                    .insert(name, String::from_utf8_lossy(data).into_owned());
            }
        }
    }

    form
}

fn disposition_param(line: &str, key: &str) -> Option<String> {
    let prefix = format!("{}=", key);
    line.split(';')
        .map(str::trim)
        .find_map(|segment| segment.strip_prefix(prefix.as_str()))
        .map(|v| v.trim_matches('"').to_string())
}

fn split_on<'a>(data: &'a [u8], delimiter: &[u8]) -> Vec<&'a [u8]> {
    let mut sections = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i + delimiter.len() <= data.len() {
        if &data[i..i + delimiter.len()] == delimiter {
            sections.push(&data[start..i]);
            i += delimiter.len();
            start = i;
        } else {
            i += 1;
        }
    }
    sections.push(&data[start..]);
    sections
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn strip_crlf(section: &[u8]) -> &[u8] {
    section.strip_prefix(b"\r\n".as_slice()).unwrap_or(section)
}

fn strip_trailing_crlf(data: &[u8]) -> &[u8] {
    data.strip_suffix(b"\r\n".as_slice()).unwrap_or(data)
}
