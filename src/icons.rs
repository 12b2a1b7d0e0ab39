//! Nerd Font glyphs for `ls`.

use std::path::Path;

const FOLDER: char = '\u{f07b}';
const FOLDER_CONFIG: char = '\u{e5fc}';
const FOLDER_GIT: char = '\u{e5fb}';
const FOLDER_GITHUB: char = '\u{e5fd}';
const FOLDER_HOME: char = '\u{f10b5}';
const FOLDER_DOCS: char = '\u{f0219}';
const FOLDER_IMAGES: char = '\u{f024f}';
const FOLDER_MUSIC: char = '\u{f1359}';
const FOLDER_VIDEOS: char = '\u{f0567}';
const FOLDER_DOWNLOADS: char = '\u{f01da}';

const FILE: char = '\u{f0219}';
const EXECUTABLE: char = '\u{f018d}';
const SYMLINK: char = '\u{f0252}';
const DOCKER: char = '\u{f0868}';
const GIT: char = '\u{f02a2}';

/// Glyph by lower-case extension (without the dot).
const EXTENSIONS: &[(&str, char)] = &[
    // development
    ("go", '\u{f07d3}'),
    ("py", '\u{f0320}'),
    ("js", '\u{f031e}'),
    ("ts", '\u{f06e6}'),
    ("jsx", '\u{f0708}'),
    ("tsx", '\u{f0708}'),
    ("vue", '\u{f0844}'),
    ("rs", '\u{f1617}'),
    ("cpp", '\u{f0672}'),
    ("c", '\u{f0671}'),
    ("h", '\u{f0672}'),
    ("java", '\u{f0b37}'),
    ("kt", '\u{f1219}'),
    ("rb", '\u{f0d2d}'),
    ("php", '\u{f031f}'),
    ("scala", '\u{f061c}'),
    ("swift", '\u{f06e5}'),
    // web
    ("html", '\u{f031d}'),
    ("css", '\u{f031c}'),
    ("scss", '\u{f031c}'),
    ("sass", '\u{f031c}'),
    ("json", '\u{f0626}'),
    ("xml", '\u{f05c0}'),
    ("yaml", '\u{f0219}'),
    ("yml", '\u{f0219}'),
    ("md", '\u{f0354}'),
    ("txt", '\u{f0219}'),
    // data
    ("sql", '\u{f01bc}'),
    ("db", '\u{f01bc}'),
    ("csv", '\u{f021b}'),
    ("xlsx", '\u{f021b}'),
    ("doc", '\u{f022c}'),
    ("pdf", '\u{f0226}'),
    // media
    ("mp3", '\u{f0386}'),
    ("wav", '\u{f0386}'),
    ("mp4", '\u{f0567}'),
    ("mov", '\u{f0567}'),
    ("png", '\u{f02e9}'),
    ("jpg", '\u{f02e9}'),
    ("jpeg", '\u{f02e9}'),
    ("gif", '\u{f02e9}'),
    ("svg", '\u{f0721}'),
    ("ico", '\u{f0032}'),
    // system
    ("sh", EXECUTABLE),
    ("bash", EXECUTABLE),
    ("zsh", EXECUTABLE),
    ("vim", '\u{f0577}'),
    ("nvim", '\u{f0577}'),
    ("env", '\u{f0493}'),
    ("log", '\u{f0331}'),
    ("lock", '\u{f033e}'),
    ("zip", '\u{f05c4}'),
    ("tar", '\u{f05c4}'),
    ("gz", '\u{f05c4}'),
    ("7z", '\u{f05c4}'),
    ("iso", '\u{f05ee}'),
];

fn folder_icon(name: &str) -> char {
    match name {
        ".git" => FOLDER_GIT,
        ".github" => FOLDER_GITHUB,
        "config" | ".config" => FOLDER_CONFIG,
        "home" => FOLDER_HOME,
        "Documents" | "docs" => FOLDER_DOCS,
        "Pictures" | "images" => FOLDER_IMAGES,
        "Music" => FOLDER_MUSIC,
        "Videos" => FOLDER_VIDEOS,
        "Downloads" => FOLDER_DOWNLOADS,
        _ => FOLDER,
    }
}

/// Pick a glyph from the entry's name and type alone.
pub fn icon_for(name: &str, is_dir: bool, is_executable: bool, is_symlink: bool) -> char {
    if is_symlink {
        return SYMLINK;
    }
    if is_dir {
        return folder_icon(name);
    }
    if is_executable {
        return EXECUTABLE;
    }

    let lower = name.to_lowercase();
    match lower.as_str() {
        "dockerfile" | ".dockerignore" => return DOCKER,
        ".gitignore" => return GIT,
        _ => {}
    }

    Path::new(&lower)
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(|ext| EXTENSIONS.iter().find(|(e, _)| *e == ext))
        .map(|(_, icon)| *icon)
        .unwrap_or(FILE)
}
