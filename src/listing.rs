//! Table view of a directory for the `ls` built-in.

use crate::error::ShellError;
use crate::icons::icon_for;
use console::Style;
use std::fmt;
use std::fs;
use std::path::Path;

/// Coarse entry type. Variant order is the listing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EntryKind {
    Directory,
    Executable,
    File,
    Symlink,
}

impl EntryKind {
    pub fn label(self) -> &'static str {
        match self {
            EntryKind::Directory => "Directory",
            EntryKind::Executable => "Executable",
            EntryKind::File => "File",
            EntryKind::Symlink => "Symlink",
        }
    }

    fn style(self) -> Style {
        match self {
            EntryKind::Directory => Style::new().blue(),
            EntryKind::Executable => Style::new().cyan(),
            EntryKind::File => Style::new().green(),
            EntryKind::Symlink => Style::new().yellow(),
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone)]
pub struct ListingEntry {
    pub name: String,
    pub size: u64,
    pub kind: EntryKind,
    pub permissions: String,
    pub icon: char,
}

impl ListingEntry {
    fn classify(name: String, is_dir: bool, is_symlink: bool, mode: u32, size: u64) -> Self {
        let is_executable = mode & 0o111 != 0;
        let kind = if is_dir {
            EntryKind::Directory
        } else if is_symlink {
            EntryKind::Symlink
        } else if is_executable {
            EntryKind::Executable
        } else {
            EntryKind::File
        };
        let type_char = if is_dir {
            'd'
        } else if is_symlink {
            'l'
        } else {
            '-'
        };
        Self {
            icon: icon_for(&name, is_dir, is_executable, is_symlink),
            name,
            size,
            kind,
            permissions: mode_string(type_char, mode),
        }
    }
}

/// `drwxr-xr-x` style rendering of the permission bits.
fn mode_string(type_char: char, mode: u32) -> String {
    let mut s = String::with_capacity(10);
    s.push(type_char);
    for shift in [6, 3, 0] {
        let bits = (mode >> shift) & 0o7;
        s.push(if bits & 0o4 != 0 { 'r' } else { '-' });
        s.push(if bits & 0o2 != 0 { 'w' } else { '-' });
        s.push(if bits & 0o1 != 0 { 'x' } else { '-' });
    }
    s
}

/// Human readable size, base 1024: `512 B`, `1.5 KB`, `3.0 MB`.
pub fn format_size(size: u64) -> String {
    const UNIT: u64 = 1024;
    if size < UNIT {
        return format!("{} B", size);
    }
    let mut div = UNIT;
    let mut exp = 0;
    let mut n = size / UNIT;
    while n >= UNIT {
        div *= UNIT;
        exp += 1;
        n /= UNIT;
    }
    let prefix = ['K', 'M', 'G', 'T', 'P', 'E'][exp];
    format!("{:.1} {}B", size as f64 / div as f64, prefix)
}

#[cfg(unix)]
fn mode_of(meta: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode()
}

#[cfg(not(unix))]
fn mode_of(meta: &fs::Metadata) -> u32 {
    if meta.permissions().readonly() { 0o444 } else { 0o644 }
}

/// Column widths measured over header labels and every row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnWidths {
    /// Includes the icon and the space after it.
    pub name: usize,
    pub size: usize,
    pub kind: usize,
    pub permissions: usize,
}

impl ColumnWidths {
    pub fn measure(entries: &[ListingEntry]) -> Self {
        let mut name = "NAME".len();
        let mut size = "SIZE".len();
        let mut kind = "TYPE".len();
        let mut permissions = "PERMISSIONS".len();
        for entry in entries {
            name = name.max(entry.name.chars().count());
            size = size.max(format_size(entry.size).len());
            kind = kind.max(entry.kind.label().len());
            permissions = permissions.max(entry.permissions.len());
        }
        Self {
            name: name + 2,
            size,
            kind,
            permissions,
        }
    }
}

/// Entries of one directory, sorted by kind and then by name.
#[derive(Debug, Clone)]
pub struct Listing {
    entries: Vec<ListingEntry>,
}

impl Listing {
    /// Read the immediate entries of `dir`. Symlinks are not followed.
    pub fn read(dir: &Path) -> Result<Self, ShellError> {
        let read_dir = fs::read_dir(dir).map_err(|source| ShellError::ListDir {
            path: dir.to_path_buf(),
            source,
        })?;
        let mut entries = Vec::new();
        for entry in read_dir.flatten() {
            // Entries that vanish while listing are skipped.
            let Ok(meta) = entry.metadata() else {
                continue;
            };
            let file_type = meta.file_type();
            entries.push(ListingEntry::classify(
                entry.file_name().to_string_lossy().into_owned(),
                file_type.is_dir(),
                file_type.is_symlink(),
                mode_of(&meta),
                meta.len(),
            ));
        }
        Ok(Self::from_entries(entries))
    }

    pub fn from_entries(mut entries: Vec<ListingEntry>) -> Self {
        entries.sort_by(|a, b| a.kind.cmp(&b.kind).then_with(|| a.name.cmp(&b.name)));
        Self { entries }
    }

    pub fn entries(&self) -> &[ListingEntry] {
        &self.entries
    }

    pub fn widths(&self) -> ColumnWidths {
        ColumnWidths::measure(&self.entries)
    }

    /// Render as a rounded box table, one line per entry.
    pub fn render(&self) -> String {
        let w = self.widths();
        let border = Style::new().color256(242);
        let header = Style::new().yellow();
        let bar = border.apply_to("│");

        let rule = |left: &str, mid: &str, right: &str| {
            border
                .apply_to(format!(
                    "{left}{}{mid}{}{mid}{}{mid}{}{right}",
                    "─".repeat(w.name + 2),
                    "─".repeat(w.size + 2),
                    "─".repeat(w.kind + 2),
                    "─".repeat(w.permissions + 2),
                ))
                .to_string()
        };

        let mut out = String::new();
        out.push_str(&rule("╭", "┬", "╮"));
        out.push('\n');
        out.push_str(&format!(
            "{bar} {} {bar} {} {bar} {} {bar} {} {bar}\n",
            header.apply_to(pad("NAME", w.name)),
            header.apply_to(pad("SIZE", w.size)),
            header.apply_to(pad("TYPE", w.kind)),
            header.apply_to(pad("PERMISSIONS", w.permissions)),
        ));
        out.push_str(&rule("├", "┼", "┤"));
        out.push('\n');
        for entry in &self.entries {
            out.push_str(&format!(
                "{bar} {} {} {bar} {} {bar} {} {bar} {} {bar}\n",
                entry.kind.style().apply_to(entry.icon),
                pad(&entry.name, w.name - 2),
                pad(&format_size(entry.size), w.size),
                pad(entry.kind.label(), w.kind),
                pad(&entry.permissions, w.permissions),
            ));
        }
        out.push_str(&rule("╰", "┴", "╯"));
        out.push('\n');
        out
    }
}

/// Left-align `text` in `width` characters.
fn pad(text: &str, width: usize) -> String {
    let len = text.chars().count();
    let mut s = String::from(text);
    s.extend(std::iter::repeat_n(' ', width.saturating_sub(len)));
    s
}
