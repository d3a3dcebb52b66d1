#![allow(dead_code)]

use flate2::write::GzEncoder;
use flate2::Compression;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::path::Path;
use std::thread;
use walkdir::WalkDir;

/// Serves fixed bodies by path on 127.0.0.1 until the test process exits.
/// Unknown paths get a 404.
pub struct FakeServer {
    pub base: String,
}

impl FakeServer {
    pub fn start(routes: Vec<(&str, Vec<u8>)>) -> Self {
        let routes: HashMap<String, Vec<u8>> = routes
            .into_iter()
            .map(|(p, b)| (p.to_string(), b))
            .collect();
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { continue };
                let mut reader = BufReader::new(stream.try_clone().unwrap());
                let mut request_line = String::new();
                if reader.read_line(&mut request_line).is_err() {
                    continue;
                }
                loop {
                    let mut header = String::new();
                    match reader.read_line(&mut header) {
                        Ok(0) => break,
                        Ok(_) if header == "\r\n" => break,
                        Ok(_) => {}
                        Err(_) => break,
                    }
                }
                let path = request_line.split_whitespace().nth(1).unwrap_or("/");
                let (status, body) = match routes.get(path) {
                    Some(b) => ("200 OK", b.as_slice()),
                    None => ("404 Not Found", &b"not found"[..]),
                };
                let head = format!(
                    "HTTP/1.1 {status}\r\nContent-Length: {}\r\nContent-Type: application/octet-stream\r\nConnection: close\r\n\r\n",
                    body.len()
                );
                let _ = stream.write_all(head.as_bytes());
                let _ = stream.write_all(body);
                let _ = stream.flush();
            }
        });
        FakeServer { base }
    }
}

pub fn tar_gz(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
    for (name, data) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_mtime(1_700_000_000);
        header.set_cksum();
        builder.append_data(&mut header, name, *data).unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap()
}

/// Relative path -> sha256 for every file under `root`.
pub fn tree_digest(root: &Path) -> Vec<(String, String)> {
    let mut out: Vec<(String, String)> = WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let rel = e.path().strip_prefix(root).unwrap().to_string_lossy().into_owned();
            let data = std::fs::read(e.path()).unwrap();
            (rel, hex::encode(Sha256::digest(&data)))
        })
        .collect();
    out.sort();
    out
}

/// Creates a git repository under `dir` with one empty commit and the given
/// lightweight tags. Returns `None` when no git binary is available.
pub fn git_repo_with_tags(dir: &Path, tags: &[&str]) -> Option<std::path::PathBuf> {
    let git = which::which("git").ok()?;
    let repo = dir.join("remote");
    std::fs::create_dir_all(&repo).unwrap();
    let run = |args: &[&str]| {
        let out = std::process::Command::new(&git)
            .args([
                "-c",
                "user.name=Kavita Tests",
                "-c",
                "user.email=tests@kavita.invalid",
                "-c",
                "commit.gpgsign=false",
                "-c",
                "tag.gpgsign=false",
                "-c",
                "init.defaultBranch=main",
            ])
            .args(args)
            .current_dir(&repo)
            .env("GIT_CONFIG_NOSYSTEM", "1")
            .env("HOME", dir)
            .output()
            .unwrap();
        assert!(out.status.success(), "git {args:?}: {out:?}");
    };
    run(&["init", "-q"]);
    run(&["commit", "-q", "--allow-empty", "-m", "release"]);
    for tag in tags {
        run(&["tag", tag]);
    }
    Some(repo)
}
