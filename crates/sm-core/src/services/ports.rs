use crate::error::{ManagerError, Result};
use crate::models::{BasePorts, PortBlock, SiteRecord};
use crate::services::inventory;

/// Hands out port blocks by advancing one offset over the configured bases.
///
/// Only the application port is checked for collisions. The other three
/// families stay free as long as every existing site was allocated here,
/// since all four move in lockstep.
pub struct PortAllocator {
    bases: PortBlock,
}

impl PortAllocator {
    pub fn new(bases: BasePorts) -> Self {
        Self {
            bases: bases.as_block(),
        }
    }

    pub fn bases(&self) -> PortBlock {
        self.bases
    }

    /// Largest offset that keeps every port of the block in range.
    pub fn max_offset(&self) -> u16 {
        u16::MAX - self.bases.max_port()
    }

    /// The lowest-offset block whose application port no existing site uses.
    pub fn next_block(&self, existing: &[SiteRecord]) -> Result<PortBlock> {
        let used = inventory::used_app_ports(existing);
        (0..=self.max_offset())
            .filter_map(|offset| self.bases.offset_by(offset))
            .find(|block| !used.contains(&block.app))
            .ok_or(ManagerError::CapacityExhausted)
    }

    /// Offset of `ports` from the bases if all four share it.
    pub fn lockstep_offset(&self, ports: &PortBlock) -> Option<u16> {
        let offset = ports.app.checked_sub(self.bases.app)?;
        (self.bases.offset_by(offset)? == *ports).then_some(offset)
    }
}

/// Log every site whose ports were not assigned in lockstep. Such a site can
/// collide with future allocations on its database, admin or transfer port;
/// allocation itself is left unchanged.
pub fn audit_lockstep<'a>(allocator: &PortAllocator, sites: &'a [SiteRecord]) -> Vec<&'a SiteRecord> {
    let drifted: Vec<&SiteRecord> = sites
        .iter()
        .filter(|s| s.app_port != 0 && allocator.lockstep_offset(&s.ports()).is_none())
        .collect();
    for site in &drifted {
        tracing::warn!(
            site = %site.name,
            app_port = site.app_port,
            db_port = site.database_port,
            pma_port = site.admin_port,
            sftp_port = site.file_transfer_port,
            "site ports are not in lockstep with the base ports"
        );
    }
    drifted
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;
    use std::path::PathBuf;

    fn site(name: &str, app: u16, db: u16, pma: u16, sftp: u16) -> SiteRecord {
        SiteRecord {
            name: name.into(),
            app_port: app,
            database_port: db,
            admin_port: pma,
            file_transfer_port: sftp,
            path: PathBuf::from("/sites").join(name),
        }
    }

    fn allocator() -> PortAllocator {
        PortAllocator::new(BasePorts::default())
    }

    #[test]
    fn empty_inventory_gets_base_block() {
        let block = allocator().next_block(&[]).unwrap();
        assert_eq!(
            block,
            PortBlock {
                app: 8001,
                database: 3301,
                admin: 8801,
                file_transfer: 2201,
            }
        );
    }

    #[test]
    fn one_site_at_base_moves_everything_by_one() {
        let existing = vec![site("a", 8001, 3301, 8801, 2201)];
        let block = allocator().next_block(&existing).unwrap();
        assert_eq!(
            block,
            PortBlock {
                app: 8002,
                database: 3302,
                admin: 8802,
                file_transfer: 2202,
            }
        );
    }

    #[test]
    fn fills_the_lowest_gap() {
        let existing = vec![
            site("a", 8001, 3301, 8801, 2201),
            site("c", 8003, 3303, 8803, 2203),
        ];
        let block = allocator().next_block(&existing).unwrap();
        assert_eq!(block.app, 8002);
        assert_eq!(block.file_transfer, 2202);
    }

    fn used_strategy() -> impl Strategy<Value = HashSet<u16>> {
        prop_oneof![
            prop::collection::hash_set(8001u16..8200, 0..150),
            prop::collection::hash_set(any::<u16>(), 0..200),
        ]
    }

    fn sites_using(used: &HashSet<u16>) -> Vec<SiteRecord> {
        used.iter()
            .enumerate()
            .map(|(i, &p)| site(&format!("s{i}"), p, 0, 0, 0))
            .collect()
    }

    proptest! {
        /// The block never reuses a claimed app port and all four ports sit
        /// at one shared offset from the bases.
        #[test]
        fn prop_next_block_avoids_used_and_keeps_lockstep(used in used_strategy()) {
            let allocator = allocator();
            let block = allocator.next_block(&sites_using(&used)).unwrap();
            prop_assert!(!used.contains(&block.app), "{} reused", block.app);
            let offset = block.app - 8001;
            prop_assert_eq!(block.database, 3301 + offset);
            prop_assert_eq!(block.admin, 8801 + offset);
            prop_assert_eq!(block.file_transfer, 2201 + offset);
            prop_assert_eq!(allocator.lockstep_offset(&block), Some(offset));
        }

        /// Every lower offset is already taken, so the lowest gap is chosen.
        #[test]
        fn prop_next_block_is_lowest_free(used in used_strategy()) {
            let block = allocator().next_block(&sites_using(&used)).unwrap();
            for app in 8001..block.app {
                prop_assert!(used.contains(&app), "{} was free but skipped", app);
            }
        }
    }

    #[test]
    fn allocation_is_deterministic() {
        let existing = vec![site("a", 8001, 3301, 8801, 2201)];
        let allocator = allocator();
        assert_eq!(
            allocator.next_block(&existing).unwrap(),
            allocator.next_block(&existing).unwrap()
        );
    }

    #[test]
    fn zero_ports_do_not_block_anything() {
        let existing = vec![site("broken", 0, 0, 0, 0)];
        assert_eq!(allocator().next_block(&existing).unwrap().app, 8001);
    }

    #[test]
    fn exhausted_range_fails() {
        let allocator = PortAllocator::new(BasePorts {
            app: 65534,
            database: 3301,
            admin: 8801,
            file_transfer: 2201,
        });
        assert_eq!(allocator.max_offset(), 1);
        let existing = vec![
            site("a", 65534, 3301, 8801, 2201),
            site("b", 65535, 3302, 8802, 2202),
        ];
        assert!(matches!(
            allocator.next_block(&existing),
            Err(ManagerError::CapacityExhausted)
        ));
    }

    #[test]
    fn audit_flags_hand_edited_sites() {
        let allocator = allocator();
        let sites = vec![
            site("fine", 8003, 3303, 8803, 2203),
            site("edited", 8004, 3310, 8804, 2204),
            site("unset", 0, 0, 0, 0),
        ];
        let drifted = audit_lockstep(&allocator, &sites);
        assert_eq!(drifted.len(), 1);
        assert_eq!(drifted[0].name, "edited");
        assert_eq!(allocator.lockstep_offset(&sites[0].ports()), Some(2));
    }
}
