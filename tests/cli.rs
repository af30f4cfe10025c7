// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use assert_cmd::prelude::*;
use image::GenericImageView;
use predicates::prelude::*;
use std::process::Command;
use tempfile::tempdir;

fn mandel() -> Command {
    Command::cargo_bin("mandel").unwrap()
}

#[test]
fn writes_an_image_of_the_requested_size() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("set.png");
    mandel()
        .args(&["-o", out.to_str().unwrap(), "-s", "64x48", "-p", "20", "-i", "100"])
        .assert()
        .success();
    let img = image::open(&out).unwrap();
    assert_eq!(img.dimensions(), (64, 48));
}

#[test]
fn antialiasing_keeps_the_output_size() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("smooth.png");
    mandel()
        .args(&[
            "-o",
            out.to_str().unwrap(),
            "-s",
            "30x20",
            "-c",
            "-0.5,0.1",
            "-p",
            "10",
            "-i",
            "60",
            "-a",
            "mitchell3",
            "-t",
            "1",
        ])
        .assert()
        .success();
    assert_eq!(image::open(&out).unwrap().dimensions(), (30, 20));
}

#[test]
fn every_strategy_runs() {
    let dir = tempdir().unwrap();
    for strategy in &["none", "bulb", "subdivision", "both", "adaptive", "3"] {
        let out = dir.path().join(format!("{}.png", strategy));
        mandel()
            .args(&["-o", out.to_str().unwrap(), "-s", "16x16", "-p", "6", "-m", strategy])
            .assert()
            .success();
        assert!(out.exists());
    }
}

#[test]
fn an_output_file_is_required() {
    mandel()
        .assert()
        .failure()
        .stderr(predicate::str::contains("output"));
}

#[test]
fn bad_arguments_are_rejected() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("never.png");
    let out = out.to_str().unwrap();
    for args in &[
        vec!["-s", "12"],
        vec!["-s", "20000x10"],
        vec!["-s", "0x10"],
        vec!["-c", "nowhere"],
        vec!["-p", "0"],
        vec!["-i", "0"],
        vec!["-m", "fastest"],
        vec!["-a", "blur"],
        vec!["-t", "0"],
        vec!["--colors", "1"],
    ] {
        mandel().arg("-o").arg(out).args(args).assert().failure();
    }
    assert!(!dir.path().join("never.png").exists());
}

#[test]
fn unknown_extensions_fail_cleanly() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("set.unknown");
    mandel()
        .args(&["-o", out.to_str().unwrap(), "-s", "8x8"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Render failure"));
}
