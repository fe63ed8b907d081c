use criterion::{Criterion, black_box, criterion_group, criterion_main};
use refscan::identity::IdentityToken;
use refscan::matcher::Pattern;
use refscan::model::PersistentId;
use refscan::progress::{CancelFlag, NullObserver};
use refscan::scan::files::{FileScanOptions, scan_files};
use std::path::PathBuf;

fn setup_corpus(files: usize) -> PathBuf {
    let root = std::env::temp_dir().join(format!(
        "refscan-bench-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    std::fs::create_dir_all(root.join("scenes")).unwrap();
    for i in 0..files {
        let body = format!(
            r#"{{"name":"doc{i}","roots":[{{"name":"node","fileId":{i},"behaviors":[
                {{"type":"Spawner","module":"combat","fileId":{fid},
                  "fields":{{"prefab":{{"fileId":7,"guid":"{guid}"}}}}}}]}}]}}"#,
            fid = i + 1000,
            guid = if i % 10 == 0 { "feedbead" } else { "00000000" },
        );
        std::fs::write(root.join(format!("scenes/doc{i}.scene")), body).unwrap();
    }
    root
}

fn cleanup(root: &PathBuf) {
    let _ = std::fs::remove_dir_all(root);
}

fn bench_matcher(c: &mut Criterion) {
    let token = IdentityToken::Persistent(PersistentId::new("feedbead", 7));
    let pattern = Pattern::token(&token);
    let mut blob = String::new();
    for i in 0..2000 {
        blob.push_str(&format!(r#"{{"fileId":{i},"guid":"0badc0de{i}"}},"#));
    }
    blob.push_str(r#"{"fileId":7,"guid":"feedbead"}"#);

    c.bench_function("matcher_contains_late_hit", |b| {
        b.iter(|| black_box(pattern.matches(black_box(&blob))))
    });
}

fn bench_file_scan(c: &mut Criterion) {
    let root = setup_corpus(200);
    let token = IdentityToken::Persistent(PersistentId::new("feedbead", 7));
    let pattern = Pattern::token(&token);
    let options = FileScanOptions {
        extension: ".scene".to_string(),
        no_ignore: true,
    };

    c.bench_function("file_scan_200_documents", |b| {
        b.iter(|| {
            let outcome = scan_files(
                black_box(&root),
                &options,
                &pattern,
                &mut NullObserver,
                &CancelFlag::new(),
            );
            black_box(outcome.matches.len())
        })
    });

    cleanup(&root);
}

criterion_group!(benches, bench_matcher, bench_file_scan);
criterion_main!(benches);
