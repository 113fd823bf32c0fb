// Drives the compiled binary through a PTY so the real event loop,
// crossterm input handling and terminal teardown all run.
//
// Requires a TTY, so it is Unix-only and ignored by default. Run with
// `cargo test --test integration_min_session -- --ignored`.

#![cfg(unix)]

use std::time::Duration;

use expectrl::{spawn, Eof};

#[test]
#[ignore]
fn quick_session_completes_and_exits() -> Result<(), Box<dyn std::error::Error>> {
    let bin = assert_cmd::cargo::cargo_bin("flinch");
    let cmd = format!(
        "{} --no-save --rows 1 --cols 2 --rounds 1 --countdown 0 --cooldown 0 --seed 1",
        bin.display()
    );

    let mut p = spawn(cmd)?;
    std::thread::sleep(Duration::from_millis(200));

    // start, then pick the first cell; right or wrong the single round ends
    p.send("\r")?;
    std::thread::sleep(Duration::from_millis(100));
    p.send("1")?;
    std::thread::sleep(Duration::from_millis(200));

    p.send("\x1b")?;
    p.expect(Eof)?;
    Ok(())
}

#[test]
#[ignore]
fn escape_on_intro_exits() -> Result<(), Box<dyn std::error::Error>> {
    let bin = assert_cmd::cargo::cargo_bin("flinch");
    let mut p = spawn(format!("{} --no-save", bin.display()))?;
    std::thread::sleep(Duration::from_millis(200));

    p.send("\x1b")?;
    p.expect(Eof)?;
    Ok(())
}
