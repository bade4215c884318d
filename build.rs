use std::process::Command;

use vergen::EmitBuilder;

/// Source tarballs carry no `.git`; vergen fails on git instructions there
fn in_git_checkout() -> bool {
    Command::new("git")
        .args(["rev-parse", "--is-inside-work-tree"])
        .output()
        .is_ok_and(|out| out.status.success())
}

fn main() {
    let mut emitter = EmitBuilder::builder();
    emitter.build_timestamp();
    if in_git_checkout() {
        // Reported by `permuta version` as the commit
        emitter.git_sha(true);
    }

    if let Err(e) = emitter.emit() {
        panic!("failed to emit build metadata for permuta: {e}");
    }
}
