//! End-to-end recognition on rendered pages.

mod common;

use std::io::Cursor;

use braille_ocr::{
    recognize, BrailleDecoder, BrailleSession, CellKind, DotMask, GridInferenceError, OcrError,
    OcrParams, Transcription,
};
use common::{add_noise, encode, Page};
use image::{DynamicImage, GrayImage, ImageFormat};

fn session(img: GrayImage) -> BrailleSession {
    BrailleSession::from_dynamic(DynamicImage::ImageLuma8(img), OcrParams::default())
        .expect("session")
}

fn transcribe(img: GrayImage) -> Transcription {
    let mut session = session(img);
    recognize(&mut session, &mut BrailleDecoder::default()).expect("recognize")
}

#[test]
fn blank_page_has_no_text() {
    let img = GrayImage::from_pixel(200, 120, image::Luma([235]));
    let t = transcribe(img);
    assert_eq!(t.text, "");
    assert_eq!(t.dot_count, 0);
    assert!(t.cells.is_empty());
    assert!(t.geometry.is_none());
}

#[test]
fn single_full_cell() {
    let t = transcribe(Page::default().render(&[vec![DotMask::FULL]]));
    assert_eq!(t.dot_count, 6);
    assert_eq!(t.cells.len(), 1);
    assert_eq!(t.cells[0].mask.bits(), 63);
    assert_eq!(t.text, "é");
}

#[test]
fn words_are_separated_by_one_blank() {
    let t = transcribe(Page::default().render_text("hello world"));
    assert_eq!(t.text, "hello world");
    assert_eq!(t.lines, 1);
    assert_eq!(t.dropped_dots, 0);

    let blanks: Vec<usize> = t
        .cells
        .iter()
        .filter(|c| c.kind == CellKind::Blank)
        .map(|c| c.column)
        .collect();
    assert_eq!(blanks, vec![5]);

    let geometry = t.geometry.expect("geometry");
    assert!((geometry.dot_pitch_x - 10.0).abs() < 1.0);
    assert!((geometry.cell_pitch_x - 25.0).abs() < 1.5);
}

#[test]
fn lines_are_read_top_to_bottom() {
    for text in ["ab\ncd", "hello\nworld"] {
        let t = transcribe(Page::default().render_text(text));
        assert_eq!(t.text, text);
        assert_eq!(t.lines, 2);

        for (i, cell) in t.cells.iter().enumerate() {
            assert_eq!(cell.index, i);
        }
        for pair in t.cells.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert!((a.line, a.column) < (b.line, b.column));
        }
        for (i, a) in t.cells.iter().enumerate() {
            for b in &t.cells[i + 1..] {
                assert!(!a.region.overlaps(&b.region), "{a:?} overlaps {b:?}");
            }
        }
    }
}

#[test]
fn number_sign_turns_letters_into_digits() {
    let mut line = vec![DotMask::from_positions(&[3, 4, 5, 6])];
    line.extend(encode("abc").remove(0));
    let t = transcribe(Page::default().render(&[line]));
    assert_eq!(t.text, "123");
}

#[test]
fn too_few_dots_is_a_grid_error() {
    let mut s = session(Page::default().render_text("a a a"));
    let err = recognize(&mut s, &mut BrailleDecoder::default()).unwrap_err();
    assert!(matches!(
        err,
        OcrError::Grid(GridInferenceError::InsufficientDots { found: 3, .. })
    ));
}

#[test]
fn uneven_lighting_is_normalized() {
    let page = Page {
        paper: 200,
        ink: 60,
        gradient: 55,
        ..Page::default()
    };
    let img = page.render_text("hello world");
    let (w, h) = img.dimensions();

    let s = session(img.clone());
    let flat = s.normalized();
    assert_eq!((flat.width, flat.height), (w as usize, h as usize));
    let view = flat.view();
    let (left, right) = (view.get(5, 5), view.get(w as usize - 5, 5));
    assert!(left.abs_diff(right) < 20, "paper {left} vs {right}");
    assert!(u16::from(left) > u16::from(view.get(30, 30)) + 100);

    assert_eq!(transcribe(img).text, "hello world");
}

#[test]
fn specks_and_scratches_are_ignored() {
    let page = Page::default();
    let mut img = page.render_text("hello world");
    let bottom = img.height() - 10;
    add_noise(&mut img, &[(12, 12), (150, 15), (300, bottom)], (40, bottom, 30));
    let t = transcribe(img);
    assert_eq!(t.text, "hello world");
    assert_eq!(t.dot_count, 31);
}

#[test]
fn annotation_stays_inside_cell_regions() {
    let img = Page::default().render_text("hello world");
    let mut s = session(img);
    let original = s.annotated().clone();
    recognize(&mut s, &mut BrailleDecoder::default()).expect("recognize");
    let cells = s.cells().expect("cells");

    let mut changed = 0;
    for (x, y, px) in s.annotated().enumerate_pixels() {
        if px == original.get_pixel(x, y) {
            continue;
        }
        changed += 1;
        let inside = cells.iter().any(|c| {
            let r = &c.region;
            (x as f32) >= r.min.x.floor()
                && (x as f32) <= r.max.x.ceil()
                && (y as f32) >= r.min.y.floor()
                && (y as f32) <= r.max.y.ceil()
        });
        assert!(inside, "pixel ({x}, {y}) changed outside every cell");
    }
    assert!(changed > 0);
}

#[test]
fn recognition_is_deterministic() {
    let img = Page::default().render_text("hello\nworld");
    let first = transcribe(img.clone());
    let second = transcribe(img);
    assert_eq!(first.text, second.text);
    assert_eq!(first.cells, second.cells);

    let mut s = session(Page::default().render_text("hello"));
    let mut decoder = BrailleDecoder::default();
    recognize(&mut s, &mut decoder).expect("recognize");
    assert_eq!(decoder.digest(), decoder.digest());
}

#[test]
fn encoded_png_is_accepted() {
    let img = Page::default().render_text("hello");
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("encode");

    let mut s = BrailleSession::from_bytes(&bytes, OcrParams::default()).expect("session");
    assert_eq!(s.dimensions(), (img.width(), img.height()));
    let t = recognize(&mut s, &mut BrailleDecoder::default()).expect("recognize");
    assert_eq!(t.text, "hello");
}
