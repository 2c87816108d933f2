//! End-to-end pipeline tests over the public API.

use texforge::{
    ColorSpace, Error, Fragment, FragmentStream, PageFragments, RawImage, Texforge,
};

fn stream_with_text(lines: &[(&str, f32)]) -> FragmentStream {
    let mut stream = FragmentStream::new("test-doc");
    let mut page = PageFragments::new(1);
    for (i, (text, size)) in lines.iter().enumerate() {
        page.add_fragment(Fragment::new(*text, *size, i as u32));
    }
    stream.add_page(page);
    stream
}

fn pixel(id: &str, value: u8) -> RawImage {
    RawImage::new(id, vec![value, value, value], 1, 1, ColorSpace::Rgb)
}

#[test]
fn conversion_is_deterministic() {
    let stream = stream_with_text(&[
        ("A Grand Title", 22.0),
        ("Some body prose with 5% figures & notes.", 11.0),
        ("E = mc^2", 11.0),
        ("x = y + 1", 11.0),
        ("- first item", 11.0),
        ("- second item", 11.0),
    ]);
    let forge = Texforge::new();
    let first = forge.convert(&stream).unwrap();
    let second = forge.convert(&stream).unwrap();
    assert_eq!(first.latex, second.latex);
}

#[test]
fn repeated_image_emitted_once() {
    let mut stream = FragmentStream::new("doc");
    for n in 1..=5 {
        let mut page = PageFragments::new(n);
        page.add_fragment(Fragment::new("text", 11.0, 0));
        // Same object id on every page, the repeated-logo case.
        page.add_image(pixel("logo", 42));
        stream.add_page(page);
    }
    let result = Texforge::new().convert(&stream).unwrap();
    assert_eq!(result.manifest.len(), 1);
    assert_eq!(result.stats.duplicate_images, 4);
    assert_eq!(result.latex.matches("\\includegraphics").count(), 1);
}

#[test]
fn same_content_different_ids_emitted_once() {
    let mut stream = FragmentStream::new("doc");
    let mut page = PageFragments::new(1);
    page.add_image(pixel("a", 7));
    page.add_image(pixel("b", 7));
    page.add_image(pixel("c", 8));
    stream.add_page(page);

    let result = Texforge::new().convert(&stream).unwrap();
    assert_eq!(result.manifest.len(), 2);
    assert_eq!(result.stats.duplicate_images, 1);
}

#[test]
fn decode_failure_leaves_placeholder_and_marks_manifest() {
    let mut stream = FragmentStream::new("doc");
    let mut page = PageFragments::new(1);
    page.add_fragment(Fragment::new("before", 11.0, 0));
    page.add_image(RawImage::new("bad", vec![1, 2], 4, 4, ColorSpace::Rgb));
    page.add_image(pixel("good", 9));
    stream.add_page(page);

    let result = Texforge::new().convert(&stream).unwrap();
    assert!(result.manifest.truncated);
    assert_eq!(result.manifest.len(), 1);
    assert_eq!(result.stats.image_failures, 1);
    assert!(result.latex.contains("% figure omitted"));
    assert_eq!(result.latex.matches("\\includegraphics").count(), 1);
}

#[test]
fn prose_heavy_document_has_no_math_groups() {
    let stream = stream_with_text(&[
        ("Recipe Notes", 20.0),
        ("Take 1/2 cup of flour and mix it in.", 11.0),
        ("Find the value of the dial and set it to medium.", 11.0),
        ("Bake for 30 minutes and let it cool.", 11.0),
    ]);
    let result = Texforge::new().convert(&stream).unwrap();
    assert_eq!(result.stats.math_groups, 0);
    assert!(!result.latex.contains("\\["));
}

#[test]
fn equations_form_display_math() {
    let stream = stream_with_text(&[
        ("Derivation", 20.0),
        ("x + y = 10", 11.0),
        ("x - y = 2", 11.0),
        ("Adding both gives the result.", 11.0),
    ]);
    let result = Texforge::new().convert(&stream).unwrap();
    assert_eq!(result.stats.math_groups, 1);
    assert!(result.latex.contains("x + y = 10 \\\\\nx - y = 2"));
}

#[test]
fn single_letter_lines_never_become_headings() {
    let stream = stream_with_text(&[
        ("Real Heading Here", 24.0),
        ("X", 24.0),
        ("body text follows the letters", 11.0),
        ("more body text at the usual size", 11.0),
        ("and a third line to anchor the modal size", 11.0),
    ]);
    let result = Texforge::new().convert(&stream).unwrap();
    assert_eq!(result.stats.headings, 1);
    assert!(result.latex.contains("\\section{Real Heading Here}"));
    assert!(!result.latex.contains("\\section{X}"));
}

#[test]
fn metadata_falls_back_to_default_title() {
    let stream = stream_with_text(&[("x", 11.0), ("page 3", 11.0)]);
    let result = Texforge::new().convert(&stream).unwrap();
    assert_eq!(result.metadata.title.as_ref().unwrap(), "test-doc");
    assert!(result.metadata.title.confidence < 0.2);
    assert!(result.latex.contains("\\title{test-doc}"));
}

#[test]
fn special_characters_escaped_exactly_once() {
    let stream = stream_with_text(&[("Margins grew 5% & costs fell 10%.", 11.0)]);
    let result = Texforge::new().convert(&stream).unwrap();
    assert!(result.latex.contains(r"5\% \& costs fell 10\%."));
    assert!(!result.latex.contains(r"\\%"));
    assert!(!result.latex.contains(r"\\&"));
}

#[test]
fn output_growth_is_bounded() {
    // A pathological input full of escapable characters must not blow up
    // past the per-character escape factor plus the fixed preamble.
    let nasty = "%&#_{}~^$".repeat(200);
    let stream = stream_with_text(&[(nasty.as_str(), 11.0)]);
    let result = Texforge::new().convert(&stream).unwrap();
    let overhead = 2048;
    assert!(result.latex.len() <= nasty.len() * 20 + overhead);
}

#[test]
fn malformed_stream_rejected_before_output() {
    let mut stream = FragmentStream::new("doc");
    let mut page = PageFragments::new(1);
    page.add_fragment(Fragment::new("b", 11.0, 2));
    page.add_fragment(Fragment::new("a", 11.0, 1));
    stream.add_page(page);

    let err = Texforge::new().convert(&stream).unwrap_err();
    assert!(matches!(err, Error::MalformedFragmentStream { .. }));
}

#[test]
fn images_disabled_skips_extraction() {
    let mut stream = FragmentStream::new("doc");
    let mut page = PageFragments::new(1);
    page.add_fragment(Fragment::new("text", 11.0, 0));
    page.add_image(pixel("logo", 1));
    stream.add_page(page);

    let result = Texforge::new().images(false).convert(&stream).unwrap();
    assert!(result.manifest.is_empty());
    assert!(!result.latex.contains("\\includegraphics"));
    assert!(!result.latex.contains("graphicx"));
}

#[test]
fn convert_all_matches_sequential() {
    let streams: Vec<FragmentStream> = (0..4)
        .map(|i| {
            stream_with_text(&[
                ("Shared Title Text", 20.0),
                ("x = 1", 11.0),
                (if i % 2 == 0 { "even body" } else { "odd body" }, 11.0),
            ])
        })
        .collect();

    let forge = Texforge::new();
    let parallel = forge.convert_all(&streams);
    for (stream, result) in streams.iter().zip(parallel) {
        let sequential = forge.convert(stream).unwrap();
        assert_eq!(result.unwrap().latex, sequential.latex);
    }
}

#[test]
fn assets_persist_as_valid_ppm() {
    let mut stream = FragmentStream::new("doc");
    let mut page = PageFragments::new(1);
    page.add_image(pixel("img", 33));
    stream.add_page(page);

    let result = Texforge::new().convert(&stream).unwrap();
    let dir = tempfile::tempdir().unwrap();
    for asset in &result.assets {
        let path = dir.path().join(asset.suggested_filename());
        std::fs::write(&path, asset.to_ppm()).unwrap();
        let written = std::fs::read(&path).unwrap();
        assert!(written.starts_with(b"P6\n"));
        assert_eq!(written.len(), 11 + 3);
    }
    assert_eq!(result.assets.len(), 1);
}

#[test]
fn full_document_structure() {
    let mut stream = FragmentStream::new("fallback");
    let mut p1 = PageFragments::new(1);
    for (i, (text, size)) in [
        ("Thermal Analysis of Widgets", 24.0f32),
        ("By Jane Roe and John Doe", 11.0),
        ("March 5, 2021", 11.0),
        ("Abstract", 12.0),
        ("We measure widget heat under load.", 11.0),
        ("Introduction", 16.0),
        ("Widgets warm up when used.", 11.0),
    ]
    .iter()
    .enumerate()
    {
        p1.add_fragment(Fragment::new(*text, *size, i as u32));
    }
    stream.add_page(p1);

    let mut p2 = PageFragments::new(2);
    p2.add_fragment(Fragment::new("Method", 16.0, 0));
    p2.add_fragment(Fragment::new("We apply a constant load to each widget.", 11.0, 1));
    p2.add_fragment(Fragment::new("Q = mcΔT", 11.0, 2));
    p2.add_image(pixel("chart", 5));
    stream.add_page(p2);

    let result = Texforge::new().convert(&stream).unwrap();

    assert_eq!(
        result.metadata.title.as_ref().unwrap(),
        "Thermal Analysis of Widgets"
    );
    assert_eq!(result.metadata.authors.as_ref().unwrap().len(), 2);
    assert_eq!(result.metadata.date.as_ref().unwrap(), "2021-03-05");
    assert!(result
        .metadata
        .abstract_text
        .as_ref()
        .unwrap()
        .contains("widget heat"));

    // The 24pt title claimed level 1 first, so 16pt headings rank below it.
    assert!(result.latex.contains("\\subsection{Introduction}"));
    assert!(result.latex.contains("\\subsection{Method}"));
    assert!(result.latex.contains("\\Delta"));
    assert_eq!(result.manifest.len(), 1);
    assert!(!result.manifest.truncated);
}
