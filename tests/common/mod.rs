//! Shared helpers: build small, valid PDFs in memory.
//!
//! Every page uses the standard Helvetica font, so no font programs are
//! embedded. An image-only page paints a 1×1 grey image and carries no text
//! operators, which is what a scanned page looks like to a text extractor.

#![allow(dead_code)]

/// One page of a generated test PDF.
pub enum TestPage<'a> {
    /// Text lines, drawn top to bottom.
    Text(&'a [&'a str]),
    /// A page that only paints an image.
    Image,
}

/// A PDF with one single-line text page per entry.
pub fn text_pdf(pages: &[&str]) -> Vec<u8> {
    let lines: Vec<[&str; 1]> = pages.iter().map(|p| [*p]).collect();
    let pages: Vec<TestPage<'_>> = lines.iter().map(|l| TestPage::Text(&l[..])).collect();
    build_pdf(&pages)
}

/// A PDF whose only page is an image.
pub fn image_only_pdf() -> Vec<u8> {
    build_pdf(&[TestPage::Image])
}

/// Assemble a complete PDF with a correct cross-reference table.
pub fn build_pdf(pages: &[TestPage<'_>]) -> Vec<u8> {
    // 1 catalog, 2 page tree, 3 font, 4 image, then (page, content) pairs.
    let page_id = |i: usize| 5 + 2 * i;
    let kids: Vec<String> = (0..pages.len())
        .map(|i| format!("{} 0 R", page_id(i)))
        .collect();

    let mut objects: Vec<Vec<u8>> = vec![
        b"<< /Type /Catalog /Pages 2 0 R >>".to_vec(),
        format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            pages.len()
        )
        .into_bytes(),
        b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .to_vec(),
        stream_object(
            "/Type /XObject /Subtype /Image /Width 1 /Height 1 \
             /ColorSpace /DeviceGray /BitsPerComponent 8",
            &[0x80],
        ),
    ];

    for (i, page) in pages.iter().enumerate() {
        let content_id = page_id(i) + 1;
        objects.push(
            format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
                 /Resources << /Font << /F1 3 0 R >> /XObject << /Im1 4 0 R >> >> \
                 /Contents {} 0 R >>",
                content_id
            )
            .into_bytes(),
        );
        objects.push(stream_object("", content_stream(page).as_bytes()));
    }

    let mut out: Vec<u8> = b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n", i + 1).as_bytes());
        out.extend_from_slice(body);
        out.extend_from_slice(b"\nendobj\n");
    }

    let xref_at = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
    out.extend_from_slice(b"0000000000 65535 f \n");
    for off in offsets {
        out.extend_from_slice(format!("{:010} 00000 n \n", off).as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_at
        )
        .as_bytes(),
    );
    out
}

fn stream_object(dict_entries: &str, data: &[u8]) -> Vec<u8> {
    let mut obj = format!("<< {} /Length {} >>\nstream\n", dict_entries, data.len()).into_bytes();
    obj.extend_from_slice(data);
    obj.extend_from_slice(b"\nendstream");
    obj
}

fn content_stream(page: &TestPage<'_>) -> String {
    match page {
        TestPage::Text(lines) => {
            let mut s = String::from("BT\n/F1 12 Tf\n72 720 Td\n");
            for (i, line) in lines.iter().enumerate() {
                if i > 0 {
                    s.push_str("0 -16 Td\n");
                }
                s.push_str(&format!("({}) Tj\n", escape(line)));
            }
            s.push_str("ET");
            s
        }
        TestPage::Image => "q\n200 0 0 200 200 300 cm\n/Im1 Do\nQ".to_string(),
    }
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('(', "\\(")
        .replace(')', "\\)")
}

/// Collapse whitespace runs so extractor spacing does not matter.
pub fn squash(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
