use criterion::{Criterion, black_box, criterion_group, criterion_main};

use dynapsy::content::ContentStore;
use dynapsy::engine::Highlighter;
use dynapsy::engine::reply;

fn sample_reply(questions: usize) -> String {
    let mut out = String::from("**مراجعة سريعة**\n\nإليك بعض الأسئلة حول الجهاز النفسي:\n\n");
    for i in 1..=questions {
        out.push_str(&format!("**س{i}: ما الجهاز المسؤول عن الغرائز؟**\n"));
        out.push_str("أ) الأنا\nب) الهو\nج) الأنا الأعلى\nد) اللاشعور\n");
        out.push_str("الإجابة الصحيحة: ب\n");
        out.push_str("الشرح الأكاديمي: الهو خزان الطاقة الغريزية ويعمل وفق مبدأ اللذة.\n\n");
    }
    out.push_str("- راجع المحاضرة الأولى\n- حاول مرة أخرى\n");
    out
}

fn bench_highlight(c: &mut Criterion) {
    let content = ContentStore::load().expect("bundled content");
    let highlighter = Highlighter::new(content.all_terms().map(|(_, entry)| entry));
    let text: String = content
        .lectures()
        .iter()
        .map(|l| l.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    c.bench_function("highlight all lectures", |b| {
        b.iter(|| highlighter.segments(black_box(&text)))
    });

    c.bench_function("build highlighter", |b| {
        b.iter(|| Highlighter::new(content.all_terms().map(|(_, entry)| black_box(entry))))
    });
}

fn bench_reply_parse(c: &mut Criterion) {
    let short = sample_reply(1);
    let long = sample_reply(20);

    c.bench_function("parse reply (1 question)", |b| {
        b.iter(|| reply::parse(black_box(&short)))
    });
    c.bench_function("parse reply (20 questions)", |b| {
        b.iter(|| reply::parse(black_box(&long)))
    });
}

criterion_group!(benches, bench_highlight, bench_reply_parse);
criterion_main!(benches);
