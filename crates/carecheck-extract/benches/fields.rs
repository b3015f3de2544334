use carecheck_extract::{Mode, extract_fields};

fn synthetic_checklist(filler_lines: usize) -> String {
    let mut text = String::new();
    for i in 0..filler_lines {
        text.push_str(&format!("R430-{i}-1 Staff records are kept on site for review\n"));
    }
    text.push_str("Approved # of Present\n14\n");
    text.push_str("Name of Individual Informed of this Inspection: Jordan Reyes\n");
    text.push_str("Licensor(s) Conducting this Inspection: Casey Moore OL Staff Present\n");
    text
}

#[divan::bench(args = [10, 100, 1000])]
fn text_layer(bencher: divan::Bencher, filler_lines: usize) {
    let text = synthetic_checklist(filler_lines);
    bencher.bench(|| extract_fields(&text, Mode::Text));
}

#[divan::bench(args = [10, 100, 1000])]
fn ocr_output(bencher: divan::Bencher, filler_lines: usize) {
    let text = synthetic_checklist(filler_lines).replace('\n', " ");
    bencher.bench(|| extract_fields(&text, Mode::Ocr));
}

#[divan::bench]
fn no_match(bencher: divan::Bencher) {
    let text = "Facility closed for the season\n".repeat(200);
    bencher.bench(|| extract_fields(&text, Mode::Text));
}

fn main() {
    divan::main();
}
