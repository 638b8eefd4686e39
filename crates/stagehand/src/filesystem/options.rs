//! fstab-style mount option parsing.

use rustix::mount::MountFlags;

// MS_* values all fit in the low 32 bits.
#[allow(clippy::cast_possible_truncation)]
const fn ms(bits: libc::c_ulong) -> MountFlags {
    MountFlags::from_bits_retain(bits as u32)
}

/// Known options: `(name, clears, flag)`.
///
/// A zero flag means the option is known but has no mount(2) flag; such
/// options are passed through as filesystem data like unknown ones.
const FLAG_OPTIONS: &[(&str, bool, MountFlags)] = &[
    ("async", true, ms(libc::MS_SYNCHRONOUS)),
    ("atime", true, ms(libc::MS_NOATIME)),
    ("bind", false, ms(libc::MS_BIND)),
    ("defaults", false, MountFlags::empty()),
    ("dev", true, ms(libc::MS_NODEV)),
    ("diratime", true, ms(libc::MS_NODIRATIME)),
    ("dirsync", false, ms(libc::MS_DIRSYNC)),
    ("exec", true, ms(libc::MS_NOEXEC)),
    ("mand", false, ms(libc::MS_MANDLOCK)),
    ("noatime", false, ms(libc::MS_NOATIME)),
    ("nodev", false, ms(libc::MS_NODEV)),
    ("nodiratime", false, ms(libc::MS_NODIRATIME)),
    ("noexec", false, ms(libc::MS_NOEXEC)),
    ("nomand", true, ms(libc::MS_MANDLOCK)),
    ("norelatime", true, ms(libc::MS_RELATIME)),
    ("nostrictatime", true, ms(libc::MS_STRICTATIME)),
    ("nosuid", false, ms(libc::MS_NOSUID)),
    ("rbind", false, ms(libc::MS_BIND | libc::MS_REC)),
    ("relatime", false, ms(libc::MS_RELATIME)),
    ("remount", false, ms(libc::MS_REMOUNT)),
    ("ro", false, ms(libc::MS_RDONLY)),
    ("rw", true, ms(libc::MS_RDONLY)),
    ("strictatime", false, ms(libc::MS_STRICTATIME)),
    ("suid", true, ms(libc::MS_NOSUID)),
    ("sync", false, ms(libc::MS_SYNCHRONOUS)),
];

/// Mount flags plus filesystem-specific data, ready for mount(2).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountOptions {
    /// Flags for mount(2).
    pub flags: MountFlags,
    /// Comma separated options the kernel passes to the filesystem.
    pub data: String,
}

impl MountOptions {
    /// Parse fstab-style options.
    ///
    /// Options are applied in order, so a later `rw` undoes an earlier `ro`.
    /// Anything that is not a mount flag (`size=10%`, `mode=755`, ...) ends
    /// up in [`MountOptions::data`] untouched.
    pub fn parse<S: AsRef<str>>(options: &[S]) -> Self {
        let mut flags = MountFlags::empty();
        let mut data = Vec::new();

        for option in options {
            let option = option.as_ref();
            match FLAG_OPTIONS.iter().find(|(name, _, _)| *name == option) {
                Some(&(_, clear, flag)) if !flag.is_empty() => {
                    if clear {
                        flags.remove(flag);
                    } else {
                        flags.insert(flag);
                    }
                }
                _ => data.push(option),
            }
        }

        Self {
            flags,
            data: data.join(","),
        }
    }
}
