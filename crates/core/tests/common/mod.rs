//! Test helpers: assemble well-formed PDF files in memory, with a real
//! xref table and computed offsets.

/// Wrap `data` in a stream object body with a correct /Length.
pub fn stream_body(data: &[u8]) -> Vec<u8> {
    let mut out = format!("<< /Length {} >>\nstream\n", data.len()).into_bytes();
    out.extend_from_slice(data);
    out.extend_from_slice(b"\nendstream");
    out
}

/// Assemble a PDF from `(objid, body)` pairs, writing a traditional xref
/// table and a trailer whose /Root points at `root`.
pub fn build_pdf(objects: &[(u32, &[u8])], root: u32) -> Vec<u8> {
    build_pdf_with_trailer(objects, &format!("/Root {root} 0 R"))
}

pub fn build_pdf_with_trailer(objects: &[(u32, &[u8])], trailer_extra: &str) -> Vec<u8> {
    let mut out = b"%PDF-1.7\n".to_vec();
    let mut offsets = Vec::new();
    for (id, body) in objects {
        offsets.push((*id, out.len()));
        out.extend_from_slice(format!("{id} 0 obj\n").as_bytes());
        out.extend_from_slice(body);
        out.extend_from_slice(b"\nendobj\n");
    }

    let max_id = objects.iter().map(|(id, _)| *id).max().unwrap_or(0);
    let xref_pos = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n", max_id + 1).as_bytes());
    out.extend_from_slice(b"0000000000 65535 f \n");
    for id in 1..=max_id {
        match offsets.iter().find(|(oid, _)| *oid == id) {
            Some((_, off)) => out.extend_from_slice(format!("{off:010} 00000 n \n").as_bytes()),
            None => out.extend_from_slice(b"0000000000 65535 f \n"),
        }
    }
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} {trailer_extra} >>\nstartxref\n{xref_pos}\n%%EOF\n",
            max_id + 1
        )
        .as_bytes(),
    );
    out
}

pub const WINANSI_FONT: &str =
    "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>";

/// A complete one-page document: catalog (1), page tree (2), page (3),
/// content stream (4), font /F1 (5).
pub fn one_page_doc(content: &[u8], font_obj: &str) -> Vec<u8> {
    let stream = stream_body(content);
    build_pdf(
        &[
            (1, b"<< /Type /Catalog /Pages 2 0 R >>"),
            (2, b"<< /Type /Pages /Kids [3 0 R] /Count 1 >>"),
            (
                3,
                b"<< /Type /Page /Parent 2 0 R /Resources << /Font << /F1 5 0 R >> >> /Contents 4 0 R >>",
            ),
            (4, &stream),
            (5, font_obj.as_bytes()),
        ],
        1,
    )
}
