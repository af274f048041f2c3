//! CPU type identifiers and their conventional architecture names.

pub const CPU_ARCH_ABI64: i32 = 0x0100_0000;
pub const CPU_ARCH_ABI64_32: i32 = 0x0200_0000;

pub const CPU_TYPE_X86: i32 = 7;
pub const CPU_TYPE_X86_64: i32 = CPU_TYPE_X86 | CPU_ARCH_ABI64;
pub const CPU_TYPE_ARM: i32 = 12;
pub const CPU_TYPE_ARM64: i32 = CPU_TYPE_ARM | CPU_ARCH_ABI64;
pub const CPU_TYPE_ARM64_32: i32 = CPU_TYPE_ARM | CPU_ARCH_ABI64_32;
pub const CPU_TYPE_POWERPC: i32 = 18;
pub const CPU_TYPE_POWERPC64: i32 = CPU_TYPE_POWERPC | CPU_ARCH_ABI64;

/// Capability bits carried in the high byte of a subtype.
pub const CPU_SUBTYPE_MASK: i32 = 0xff00_0000_u32 as i32;

pub const CPU_SUBTYPE_X86_ALL: i32 = 3;
pub const CPU_SUBTYPE_X86_64_H: i32 = 8;
pub const CPU_SUBTYPE_ARM_V6: i32 = 6;
pub const CPU_SUBTYPE_ARM_V7: i32 = 9;
pub const CPU_SUBTYPE_ARM_V7S: i32 = 11;
pub const CPU_SUBTYPE_ARM_V7K: i32 = 12;
pub const CPU_SUBTYPE_ARM64_ALL: i32 = 0;
pub const CPU_SUBTYPE_ARM64_E: i32 = 2;
pub const CPU_SUBTYPE_ARM64_32_V8: i32 = 1;
pub const CPU_SUBTYPE_POWERPC_ALL: i32 = 0;

const ARCHES: &[(&str, i32, i32)] = &[
    ("i386", CPU_TYPE_X86, CPU_SUBTYPE_X86_ALL),
    ("x86_64", CPU_TYPE_X86_64, CPU_SUBTYPE_X86_ALL),
    ("x86_64h", CPU_TYPE_X86_64, CPU_SUBTYPE_X86_64_H),
    ("armv6", CPU_TYPE_ARM, CPU_SUBTYPE_ARM_V6),
    ("armv7", CPU_TYPE_ARM, CPU_SUBTYPE_ARM_V7),
    ("armv7s", CPU_TYPE_ARM, CPU_SUBTYPE_ARM_V7S),
    ("armv7k", CPU_TYPE_ARM, CPU_SUBTYPE_ARM_V7K),
    ("arm64", CPU_TYPE_ARM64, CPU_SUBTYPE_ARM64_ALL),
    ("arm64e", CPU_TYPE_ARM64, CPU_SUBTYPE_ARM64_E),
    ("arm64_32", CPU_TYPE_ARM64_32, CPU_SUBTYPE_ARM64_32_V8),
    ("ppc", CPU_TYPE_POWERPC, CPU_SUBTYPE_POWERPC_ALL),
    ("ppc64", CPU_TYPE_POWERPC64, CPU_SUBTYPE_POWERPC_ALL),
];

/// Conventional name of `(cpu_type, cpu_subtype)`, ignoring capability bits.
pub fn name(cpu_type: i32, cpu_subtype: i32) -> Option<&'static str> {
    let sub = cpu_subtype & !CPU_SUBTYPE_MASK;
    ARCHES
        .iter()
        .find(|&&(_, t, s)| t == cpu_type && s == sub)
        .map(|&(n, _, _)| n)
}

/// Inverse of [`name`].
pub fn from_name(name: &str) -> Option<(i32, i32)> {
    ARCHES
        .iter()
        .find(|&&(n, _, _)| n == name)
        .map(|&(_, t, s)| (t, s))
}

/// Name if known, otherwise the raw identifiers.
pub fn describe(cpu_type: i32, cpu_subtype: i32) -> String {
    match name(cpu_type, cpu_subtype) {
        Some(n) => n.to_string(),
        None => format!("cputype {cpu_type} subtype {cpu_subtype}"),
    }
}

/// Every name [`from_name`] accepts.
pub fn known_names() -> impl Iterator<Item = &'static str> {
    ARCHES.iter().map(|&(n, _, _)| n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for n in known_names() {
            let (t, s) = from_name(n).unwrap();
            assert_eq!(name(t, s), Some(n));
        }
    }

    #[test]
    fn capability_bits_ignored() {
        let ptrauth = CPU_SUBTYPE_ARM64_E | (0x8000_0000_u32 as i32);
        assert_eq!(name(CPU_TYPE_ARM64, ptrauth), Some("arm64e"));
        assert_eq!(CPU_TYPE_X86_64, 0x0100_0007);
        assert_eq!(CPU_TYPE_ARM64, 0x0100_000c);
    }

    #[test]
    fn unknown_pairs() {
        assert_eq!(name(99, 0), None);
        assert_eq!(from_name("sparc"), None);
        assert_eq!(describe(99, -1), "cputype 99 subtype -1");
        assert_eq!(describe(CPU_TYPE_X86, CPU_SUBTYPE_X86_ALL), "i386");
    }
}
