//! End-to-end tests for the ap-storage-ext2-* crates.

pub mod mkfs;

#[cfg(test)]
mod tests {
    use crate::mkfs::MakeExt2;
    use ap_storage::{Error, Offset, Read, ReadSlice};
    use ap_storage_ext2::dir::FileKind;
    use ap_storage_ext2_ro::{bitmap::FreeRange, range::GroupRange, ErrorKind, Ext2Image};

    /// A disk whose device fails behind a certain offset.
    struct FailingDisk<'a> {
        image: ReadSlice<'a>,
        fail_at: Offset,
    }

    impl Read for FailingDisk<'_> {
        fn read_bytes(&self, offset: Offset, buf: &mut [u8]) -> Result<usize, Error> {
            if offset + buf.len() as Offset > self.fail_at {
                return Err(Error::msg("device gone"));
            }
            self.image.read_bytes(offset, buf)
        }
    }

    fn r(first: u64, last: u64) -> GroupRange {
        GroupRange { first, last }
    }

    fn f(first: u64, last: u64) -> FreeRange {
        FreeRange { first, last }
    }

    /// Three groups of 1 KiB blocks where the last one is short.
    fn three_groups() -> MakeExt2 {
        MakeExt2::small().blocks(1000).blocks_per_group(400).inodes_per_group(48)
    }

    #[test]
    fn three_groups_report() {
        let image = three_groups().label("scratch").build();
        let disk = ReadSlice(&image);
        let fs = Ext2Image::new(&disk).unwrap();
        let report = fs.report().unwrap();

        let s = &report.summary;
        assert_eq!(s.block_size, 1024);
        assert_eq!(s.blocks_count, 1000);
        assert_eq!(s.disk_size, 1024 * 1000);
        assert_eq!(s.blocks_per_group, 400);
        assert_eq!(s.inode_size, 128);
        assert_eq!(s.inodes_per_group, 48);
        assert_eq!(s.inode_table_blocks, 6);
        assert_eq!(s.group_count, 3);
        assert_eq!(s.inodes_count, 144);
        assert_eq!(s.free_inodes_count, 37 + 48 + 48);
        assert_eq!(s.volume_name, "scratch");

        let blocks: Vec<_> = report.groups.iter().map(|g| g.blocks).collect();
        assert_eq!(blocks, [r(1, 400), r(401, 800), r(801, 1200)]);
        let inodes: Vec<_> = report.groups.iter().map(|g| g.inodes).collect();
        assert_eq!(inodes, [r(1, 48), r(49, 96), r(97, 144)]);

        let free_blocks: Vec<_> = report.groups.iter().map(|g| g.free_blocks.clone()).collect();
        assert_eq!(free_blocks, [vec![f(12, 400)], vec![f(409, 800)], vec![f(809, 999)]]);
        let free_inodes: Vec<_> = report.groups.iter().map(|g| g.free_inodes.clone()).collect();
        assert_eq!(free_inodes, [vec![f(12, 48)], vec![f(49, 96)], vec![f(97, 144)]]);

        // the bitmaps agree with the descriptors
        for group in &report.groups {
            let free: u64 = group.free_blocks.iter().map(|r| r.len()).sum();
            assert_eq!(free, group.desc.free_blocks_count as u64, "group {}", group.index);
            let free: u64 = group.free_inodes.iter().map(|r| r.len()).sum();
            assert_eq!(free, group.desc.free_inodes_count as u64, "group {}", group.index);
        }
        assert_eq!(report.groups[0].desc.used_dirs_count, 2);
        assert_eq!(report.groups[2].desc.block_bitmap, 801);

        let names: Vec<_> = report.root.iter().map(|e| e.name_lossy().into_owned()).collect();
        assert_eq!(names, [".", "..", "lost+found"]);
        assert_eq!(report.root[2].inode, 11);
        assert_eq!(report.root[2].kind(), FileKind::Directory);
    }

    #[test]
    fn exact_multiple_has_no_extra_group() {
        let image = MakeExt2::small().blocks(800).blocks_per_group(400).inodes_per_group(48).build();
        let disk = ReadSlice(&image);
        let fs = Ext2Image::new(&disk).unwrap();
        assert_eq!(fs.groups().len(), 2);
        assert_eq!(fs.report().unwrap().groups.len(), 2);
    }

    #[test]
    fn large_blocks_and_inodes() {
        let mkfs = MakeExt2::small()
            .log_block_size(2)
            .blocks(100)
            .blocks_per_group(32768)
            .inodes_per_group(32)
            .inode_size(256)
            .entry(12, 1, "hello.txt")
            .entry(13, 7, "link");
        let image = mkfs.build();
        let disk = ReadSlice(&image);
        let fs = Ext2Image::new(&disk).unwrap();
        assert_eq!(fs.superblock().block_size(), 4096);
        assert_eq!(fs.superblock().inode_size(), 256);
        assert_eq!(fs.groups()[0], {
            let mut desc = mkfs.desc(0);
            desc.free_blocks_count = 93;
            desc.free_inodes_count = 21;
            desc.used_dirs_count = 2;
            desc
        });

        let report = fs.report().unwrap();
        assert_eq!(report.groups.len(), 1);
        assert_eq!(report.groups[0].blocks, r(0, 99));
        assert_eq!(report.groups[0].free_blocks, [f(7, 99)]);
        assert_eq!(report.groups[0].free_inodes, [f(12, 32)]);

        let kinds: Vec<_> = report.root.iter().map(|e| e.kind()).collect();
        assert_eq!(
            kinds,
            [FileKind::Directory, FileKind::Directory, FileKind::Directory, FileKind::Regular, FileKind::SymLink]
        );
        assert_eq!(report.root[3].name, b"hello.txt");
        assert_eq!(report.root[3].rec_len, 20);
        assert_eq!(report.root[4].rec_len as u64, 4096 - 12 - 12 - 20 - 20);
    }

    #[test]
    fn lone_free_block() {
        let mkfs = three_groups();
        let mut image = mkfs.build();
        let bitmap = mkfs.desc(1).block_bitmap as usize * 1024;
        image[bitmap..bitmap + 1024].fill(0xff);
        image[bitmap + 2] = !(1 << 4);

        let disk = ReadSlice(&image);
        let report = Ext2Image::new(&disk).unwrap().report().unwrap();
        assert_eq!(report.groups[1].free_blocks, [f(421, 421)]);
        assert_eq!(report.groups[1].free_blocks[0].to_string(), "421");
    }

    #[test]
    fn truncated_bitmap_aborts_report() {
        let mkfs = three_groups();
        let mut image = mkfs.build();
        image.truncate(mkfs.desc(2).block_bitmap as usize * 1024 + 100);

        let disk = ReadSlice(&image);
        let fs = Ext2Image::new(&disk).unwrap();
        let err = fs.report().unwrap_err();
        assert_eq!(ErrorKind::of(&err), ErrorKind::TruncatedRead);
    }

    #[test]
    fn device_error_aborts_report() {
        let mkfs = three_groups();
        let image = mkfs.build();
        let disk = FailingDisk {
            image: ReadSlice(&image),
            fail_at: mkfs.desc(2).block_bitmap as u64 * 1024 + 100,
        };
        let fs = Ext2Image::new(&disk).unwrap();
        let err = fs.report().unwrap_err();
        assert_eq!(ErrorKind::of(&err), ErrorKind::Io);
        assert!(format!("{err:#}").contains("device gone"));
    }

    #[test]
    fn truncated_superblock() {
        let mut image = three_groups().build();
        image.truncate(2000);
        let disk = ReadSlice(&image);
        let err = Ext2Image::new(&disk).err().unwrap();
        assert_eq!(ErrorKind::of(&err), ErrorKind::TruncatedRead);
    }

    #[test]
    fn root_that_is_no_directory() {
        let mkfs = three_groups();
        let mut image = mkfs.build();
        let root = mkfs.desc(0).inode_table as usize * 1024 + 128;
        image[root..root + 2].copy_from_slice(&0o100644u16.to_le_bytes());

        let disk = ReadSlice(&image);
        let fs = Ext2Image::new(&disk).unwrap();
        assert!(!fs.root_inode().unwrap().is_dir());
        assert!(fs.report().unwrap().root.is_empty());
    }

    #[test]
    fn zero_record_length_is_malformed() {
        let mkfs = three_groups();
        let mut image = mkfs.build();
        let entry = mkfs.root_block() as usize * 1024;
        image[entry + 4..entry + 6].fill(0);

        let disk = ReadSlice(&image);
        let fs = Ext2Image::new(&disk).unwrap();
        let err = fs.report().unwrap_err();
        assert_eq!(ErrorKind::of(&err), ErrorKind::MalformedLayout);
        // the groups can still be decoded without the root directory
        assert_eq!(fs.report_with(false).unwrap().groups.len(), 3);
    }

    #[test]
    fn decoding_is_deterministic() {
        let image = three_groups().entry(12, 1, "a").build();
        let disk = ReadSlice(&image);
        let first = Ext2Image::new(&disk).unwrap();
        let second = Ext2Image::new(&disk).unwrap();
        assert_eq!(first.superblock(), second.superblock());
        assert_eq!(first.groups(), second.groups());
        assert_eq!(first.report().unwrap(), second.report().unwrap());
    }

    #[test]
    fn report_as_json() {
        let image = three_groups().build();
        let disk = ReadSlice(&image);
        let report = Ext2Image::new(&disk).unwrap().report().unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["summary"]["group_count"], 3);
        assert_eq!(json["groups"][1]["free_blocks"][0]["first"], 409);
        assert_eq!(json["groups"][2]["blocks"]["last"], 1200);
        assert_eq!(json["root"][2]["name"], "lost+found");
    }
}
