mod byte_stream;

pub use byte_stream::ByteStream;

const FALLBACK_FILENAME: &str = "video";

/// `Content-Disposition` value for downloading `title` as an mp4 file.
///
/// The quoted `filename` is kept to printable ASCII so it is a valid header
/// value; the full title goes into the RFC 5987 `filename*` parameter when
/// it contains anything else.
pub fn attachment_disposition(title: &str) -> String {
  let name = sanitize_filename(title);
  let ascii: String = name
    .chars()
    .map(|c| if c.is_ascii() { c } else { '_' })
    .collect();

  if ascii == name {
    format!("attachment; filename=\"{name}.mp4\"")
  } else {
    format!(
      "attachment; filename=\"{ascii}.mp4\"; filename*=UTF-8''{}.mp4",
      urlencoding::encode(&name)
    )
  }
}

fn sanitize_filename(title: &str) -> String {
  let name: String = title
    .chars()
    .map(|c| match c {
      '"' | '\\' | '/' | ':' | '*' | '?' | '<' | '>' | '|' => '_',
      c if c.is_control() => ' ',
      c => c,
    })
    .collect();

  let name = name.trim();
  if name.is_empty() {
    FALLBACK_FILENAME.to_string()
  } else {
    name.to_string()
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn test_attachment_disposition() {
    assert_eq!(
      attachment_disposition("My Short"),
      "attachment; filename=\"My Short.mp4\""
    );
    assert_eq!(
      attachment_disposition("a \"quoted\" / title"),
      "attachment; filename=\"a _quoted_ _ title.mp4\""
    );
    assert_eq!(
      attachment_disposition("  \n "),
      "attachment; filename=\"video.mp4\""
    );
    assert_eq!(
      attachment_disposition("\tline\none\r\n"),
      "attachment; filename=\"line one.mp4\""
    );
    assert_eq!(
      attachment_disposition("café"),
      "attachment; filename=\"caf_.mp4\"; filename*=UTF-8''caf%C3%A9.mp4"
    );
  }
}
