//! Static symbol tables for each EVE chip generation.
//!
//! Tables are kept per generation rather than merged: the key sets overlap
//! with different meanings (for example `0xFFFF_FF65` is `CMD_WAIT` on FT81x
//! and `CMD_DDRSHUTDOWN` on BT82x).

/// FT81x/BT81x tables.
pub mod ft81x;
/// BT82x tables.
pub mod bt82x;

/// Immutable key-sorted mapping from a numeric key to its canonical name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolTable {
    entries: &'static [(u32, &'static str)],
}

impl SymbolTable {
    /// Wraps a key-sorted entry slice.
    #[must_use]
    pub const fn new(entries: &'static [(u32, &'static str)]) -> Self {
        Self { entries }
    }

    /// An empty table, for generations that lack a category.
    #[must_use]
    pub const fn empty() -> Self {
        Self { entries: &[] }
    }

    /// Returns the name bound to `key`, if any.
    #[must_use]
    pub fn lookup(&self, key: u32) -> Option<&'static str> {
        self.entries
            .binary_search_by_key(&key, |(entry_key, _)| *entry_key)
            .ok()
            .map(|index| self.entries[index].1)
    }

    /// Returns `true` when `key` has an entry.
    #[must_use]
    pub fn contains(&self, key: u32) -> bool {
        self.lookup(key).is_some()
    }

    /// Returns every entry in ascending key order.
    #[must_use]
    pub const fn entries(&self) -> &'static [(u32, &'static str)] {
        self.entries
    }

    /// Number of entries.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when the table has no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The full set of tables for one chip generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolSet {
    /// Host command opcode to name.
    pub host_commands: SymbolTable,
    /// Register address to name.
    pub registers: SymbolTable,
    /// Display-list opcode (top byte, low 24 bits clear) to name.
    pub dl_opcodes: SymbolTable,
    /// Coprocessor command word to name.
    pub copro_commands: SymbolTable,
    /// Boot-status sentinel word to description.
    pub boot_status: SymbolTable,
}

impl SymbolSet {
    /// Named tables in a fixed order, for listing.
    #[must_use]
    pub const fn named(&self) -> [(&'static str, SymbolTable); 5] {
        [
            ("host commands", self.host_commands),
            ("registers", self.registers),
            ("display-list opcodes", self.dl_opcodes),
            ("coprocessor commands", self.copro_commands),
            ("boot status", self.boot_status),
        ]
    }
}

/// Tables for FT81x/BT81x.
pub const FT81X_SYMBOLS: SymbolSet = SymbolSet {
    host_commands: ft81x::HOST_COMMANDS,
    registers: ft81x::REGISTERS,
    dl_opcodes: ft81x::DL_OPCODES,
    copro_commands: ft81x::COPRO_COMMANDS,
    boot_status: SymbolTable::empty(),
};

/// Tables for BT82x.
pub const BT82X_SYMBOLS: SymbolSet = SymbolSet {
    host_commands: bt82x::HOST_COMMANDS,
    registers: bt82x::REGISTERS,
    dl_opcodes: bt82x::DL_OPCODES,
    copro_commands: bt82x::COPRO_COMMANDS,
    boot_status: bt82x::BOOT_STATUS,
};

#[cfg(test)]
mod tests {
    use super::{SymbolSet, SymbolTable, BT82X_SYMBOLS, FT81X_SYMBOLS};

    fn assert_sorted_unique(set: &SymbolSet) {
        for (name, table) in set.named() {
            for pair in table.entries().windows(2) {
                assert!(
                    pair[0].0 < pair[1].0,
                    "{name} not strictly ascending at 0x{:08X}",
                    pair[1].0
                );
            }
        }
    }

    #[test]
    fn tables_are_strictly_sorted_for_binary_search() {
        assert_sorted_unique(&FT81X_SYMBOLS);
        assert_sorted_unique(&BT82X_SYMBOLS);
    }

    #[test]
    fn every_entry_resolves_via_lookup() {
        for set in [FT81X_SYMBOLS, BT82X_SYMBOLS] {
            for (_, table) in set.named() {
                for (key, name) in table.entries() {
                    assert_eq!(table.lookup(*key), Some(*name));
                }
            }
        }
    }

    #[test]
    fn generations_disagree_on_shared_keys() {
        assert_eq!(FT81X_SYMBOLS.copro_commands.lookup(0xFFFF_FF65), Some("CMD_WAIT"));
        assert_eq!(
            BT82X_SYMBOLS.copro_commands.lookup(0xFFFF_FF65),
            Some("CMD_DDRSHUTDOWN")
        );
        assert_eq!(FT81X_SYMBOLS.registers.lookup(0x0030_2000), Some("REG_ID"));
        assert_eq!(BT82X_SYMBOLS.registers.lookup(0x7F00_6000), Some("REG_ID"));
    }

    #[test]
    fn dl_opcodes_only_use_the_top_byte() {
        for set in [FT81X_SYMBOLS, BT82X_SYMBOLS] {
            for (key, _) in set.dl_opcodes.entries() {
                assert_eq!(key & 0x00FF_FFFF, 0);
            }
        }
    }

    #[test]
    fn copro_commands_share_the_ffffff_prefix() {
        for set in [FT81X_SYMBOLS, BT82X_SYMBOLS] {
            for (key, name) in set.copro_commands.entries() {
                assert_eq!(key & 0xFFFF_FF00, 0xFFFF_FF00, "{name}");
            }
        }
    }

    #[test]
    fn earlier_generation_has_no_boot_status_table() {
        assert!(FT81X_SYMBOLS.boot_status.is_empty());
        assert_eq!(BT82X_SYMBOLS.boot_status.len(), 24);
    }

    #[test]
    fn missing_key_is_none() {
        let table = SymbolTable::new(&[(1, "ONE"), (3, "THREE")]);
        assert_eq!(table.lookup(2), None);
        assert!(table.contains(3));
        assert!(!SymbolTable::empty().contains(0));
    }
}
