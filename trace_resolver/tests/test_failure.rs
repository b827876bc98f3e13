#![cfg(unix)]

use std::fs::{set_permissions, write};
use std::os::unix::fs::PermissionsExt;


#[test]
fn test_crash_file_not_present() {
    let setup = setup::setup(setup::TWO_FRAME_ANSWERS);
    let not_present = setup.test_dir.path().join("no.such.log");

    let output = setup.command(&not_present).output().unwrap();

    assert_eq!(output.status.code(), Some(3));
    let err_msg = String::from_utf8_lossy(&output.stderr);
    assert!(
        err_msg.contains("failed to open crash file")
            && err_msg.contains(not_present.to_str().unwrap())
    );
    assert!(setup.calls().is_empty());
}

#[test]
fn test_crash_file_is_a_directory() {
    let setup = setup::setup(setup::TWO_FRAME_ANSWERS);
    let directory = setup.test_dir.path().join("crash.d");
    std::fs::create_dir(&directory).unwrap();

    let output = setup.command(&directory).output().unwrap();

    assert_eq!(output.status.code(), Some(3));
    let err_msg = String::from_utf8_lossy(&output.stderr);
    assert!(err_msg.contains("failed to read crash file at line 1"));
    assert!(output.stdout.is_empty());
}

#[test]
fn test_executable_not_present() {
    let setup = setup::setup(setup::TWO_FRAME_ANSWERS);
    let crash_file = setup.write_crash_file(setup::TWO_FRAME_TRACE);
    let not_present = setup.test_dir.path().join("no.such.elf");

    let output = setup::bare_command()
        .arg("-c")
        .arg(&crash_file)
        .arg("-e")
        .arg(&not_present)
        .arg("--addr2line")
        .arg(&setup.resolver_path)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(3));
    let err_msg = String::from_utf8_lossy(&output.stderr);
    assert!(
        err_msg.contains("does not exist") && err_msg.contains(not_present.to_str().unwrap())
    );
}

#[test]
fn test_resolver_not_present() {
    let setup = setup::setup(setup::TWO_FRAME_ANSWERS);
    let crash_file = setup.write_crash_file(setup::TWO_FRAME_TRACE);
    let not_present = setup.test_dir.path().join("no-such-addr2line");

    let output = setup::bare_command()
        .arg("-c")
        .arg(&crash_file)
        .arg("-e")
        .arg(&setup.executable_path)
        .arg("--addr2line")
        .arg(&not_present)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(4));
    let err_msg = String::from_utf8_lossy(&output.stderr);
    assert!(
        err_msg.contains("could not locate resolver")
            && err_msg.contains(not_present.to_str().unwrap())
    );
    assert!(output.stdout.is_empty());
}

#[test]
fn test_resolver_not_on_path() {
    let setup = setup::setup(setup::TWO_FRAME_ANSWERS);
    let crash_file = setup.write_crash_file(setup::TWO_FRAME_TRACE);

    let output = setup::bare_command()
        .arg("-c")
        .arg(&crash_file)
        .arg("-e")
        .arg(&setup.executable_path)
        .env("PATH", setup.test_dir.path().join("empty"))
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(4));
    let err_msg = String::from_utf8_lossy(&output.stderr);
    assert!(err_msg.contains("riscv64-unknown-elf-addr2line, addr2line"));
}

#[test]
fn test_resolver_not_executable() {
    let setup = setup::setup(setup::TWO_FRAME_ANSWERS);
    set_permissions(&setup.resolver_path, PermissionsExt::from_mode(0o644)).unwrap();
    let crash_file = setup.write_crash_file(setup::TWO_FRAME_TRACE);

    let output = setup.command(&crash_file).output().unwrap();

    assert_eq!(output.status.code(), Some(4));
    let err_msg = String::from_utf8_lossy(&output.stderr);
    assert!(
        err_msg.contains("failed to spawn resolver")
            && err_msg.contains(setup.resolver_path.to_str().unwrap())
    );
}

#[test]
fn test_missing_executable_flag() {
    let setup = setup::setup(setup::TWO_FRAME_ANSWERS);
    let crash_file = setup.write_crash_file(setup::TWO_FRAME_TRACE);

    let output = setup::bare_command()
        .arg("-c")
        .arg(&crash_file)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    let err_msg = String::from_utf8_lossy(&output.stderr);
    assert!(err_msg.contains("--executable"));
}

#[test]
fn test_invalid_timeout() {
    let setup = setup::setup(setup::TWO_FRAME_ANSWERS);
    let crash_file = setup.write_crash_file(setup::TWO_FRAME_TRACE);

    let output = setup
        .command(&crash_file)
        .arg("--timeout")
        .arg("0")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    assert!(setup.calls().is_empty());
}

#[test]
fn test_empty_resolver_output_is_skipped() {
    let setup = setup::setup(&[
        ("0x80002000", "true"),
        ("0x80002100", "echo '0x80002100 main at /kernel/init.c:5'"),
    ]);
    let crash_file = setup.write_crash_file(setup::TWO_FRAME_TRACE);

    let output = setup.command(&crash_file).output().unwrap();

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "1: main\n");
    let err_msg = String::from_utf8_lossy(&output.stderr);
    assert!(
        err_msg.contains("frame 0: on line 2 unresolved") && err_msg.contains("0x80002000")
    );
}

#[test]
fn test_failing_lookup_is_skipped() {
    let setup = setup::setup(&[(
        "0x80002100",
        "echo '0x80002100 main at /kernel/init.c:5'",
    )]);
    let crash_file = setup.write_crash_file(setup::TWO_FRAME_TRACE);

    let output = setup.command(&crash_file).output().unwrap();

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "1: main\n");
    let err_msg = String::from_utf8_lossy(&output.stderr);
    assert!(err_msg.contains("cannot resolve 0x80002000"));
    assert_eq!(setup.resolved_addresses(), ["0x80002000", "0x80002100"]);
}

#[test]
fn test_strict_run_fails_after_full_report() {
    let setup = setup::setup(&[
        ("0x80002000", "echo '0x80002000'"),
        ("0x80002100", "echo '0x80002100 main at /kernel/init.c:5'"),
    ]);
    let crash_file = setup.write_crash_file(setup::TWO_FRAME_TRACE);

    let output = setup.command(&crash_file).arg("--strict").output().unwrap();

    assert_eq!(output.status.code(), Some(5));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "1: main\n");
    let err_msg = String::from_utf8_lossy(&output.stderr);
    assert!(err_msg.contains("1 frame(s) could not be resolved"));
}

#[test]
fn test_hung_lookup_times_out() {
    let setup = setup::setup(&[
        ("0x80002000", "exec sleep 30"),
        ("0x80002100", "echo '0x80002100 main at /kernel/init.c:5'"),
    ]);
    let crash_file = setup.write_crash_file(setup::TWO_FRAME_TRACE);

    let output = setup
        .command(&crash_file)
        .arg("--timeout")
        .arg("0.5")
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "1: main\n");
    let err_msg = String::from_utf8_lossy(&output.stderr);
    assert!(err_msg.contains("timed out"));
}

#[test]
fn test_binary_crash_file() {
    let setup = setup::setup(setup::TWO_FRAME_ANSWERS);
    let crash_file = setup.test_dir.path().join("crash.bin");
    write(&crash_file, b"\x00\xff\xfe\n   1: \xc3 ra: 0x80002100\r\n\xff").unwrap();

    let output = setup.command(&crash_file).output().unwrap();

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "1: main\n");
}
