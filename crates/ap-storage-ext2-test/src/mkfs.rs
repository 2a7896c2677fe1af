//! Make small but consistent ext2 images in memory.

use ap_storage_ext2::{group::GroupDesc, superblock::EXT2_MAGIC};

/// The last reserved inode, `lost+found` comes next.
const FIRST_INO: u32 = 11;

/// An ext2 image builder.
///
/// Every group starts with its block bitmap, inode bitmap and inode table.
/// Group zero has the superblock and the descriptor table in front of them
/// and the root directory block behind them. There are no backups.
#[derive(Debug, Clone)]
pub struct MakeExt2 {
    log_block_size: u32,
    blocks_count: u32,
    blocks_per_group: u32,
    inodes_per_group: u32,
    inode_size: u16,
    label: [u8; 16],
    root: Vec<(u32, u8, Vec<u8>)>,
}

impl MakeExt2 {
    /// 1 KiB blocks, a single group.
    pub fn small() -> Self {
        Self {
            log_block_size: 0,
            blocks_count: 1024,
            blocks_per_group: 8192,
            inodes_per_group: 128,
            inode_size: 128,
            label: [0; 16],
            root: vec![(2, 2, b".".to_vec()), (2, 2, b"..".to_vec()), (FIRST_INO, 2, b"lost+found".to_vec())],
        }
    }

    pub fn log_block_size(self, v: u32) -> Self {
        Self { log_block_size: v, ..self }
    }

    pub fn blocks(self, v: u32) -> Self {
        Self { blocks_count: v, ..self }
    }

    pub fn blocks_per_group(self, v: u32) -> Self {
        Self { blocks_per_group: v, ..self }
    }

    pub fn inodes_per_group(self, v: u32) -> Self {
        Self { inodes_per_group: v, ..self }
    }

    pub fn inode_size(self, v: u16) -> Self {
        Self { inode_size: v, ..self }
    }

    pub fn label(self, v: &str) -> Self {
        let mut label = [0u8; 16];
        label[..v.len()].copy_from_slice(v.as_bytes());
        Self { label, ..self }
    }

    /// Add an entry to the root directory.
    pub fn entry(mut self, inode: u32, file_type: u8, name: &str) -> Self {
        self.root.push((inode, file_type, name.as_bytes().to_vec()));
        self
    }

    pub fn block_size(&self) -> u64 {
        1024 << self.log_block_size
    }

    pub fn first_data_block(&self) -> u64 {
        if self.log_block_size == 0 { 1 } else { 0 }
    }

    pub fn group_count(&self) -> u64 {
        (self.blocks_count as u64 - 1) / self.blocks_per_group as u64 + 1
    }

    pub fn inodes_count(&self) -> u64 {
        self.group_count() * self.inodes_per_group as u64
    }

    /// Blocks of an inode table.
    pub fn table_blocks(&self) -> u64 {
        (self.inodes_per_group as u64 * self.inode_size as u64).div_ceil(self.block_size())
    }

    /// Where the metadata of a group is placed.
    pub fn desc(&self, group: u64) -> GroupDesc {
        let mut start = self.first_data_block() + group * self.blocks_per_group as u64;
        if group == 0 {
            start += 2;
        }
        GroupDesc {
            block_bitmap: start as u32,
            inode_bitmap: start as u32 + 1,
            inode_table: start as u32 + 2,
            ..Default::default()
        }
    }

    /// The data block of the root directory.
    pub fn root_block(&self) -> u64 {
        self.desc(0).inode_table as u64 + self.table_blocks()
    }

    /// The blocks in use by a group, relative to the group start.
    fn used_blocks(&self, group: u64) -> u64 {
        let start = self.first_data_block() + group * self.blocks_per_group as u64;
        let end = self.desc(group).inode_table as u64 + self.table_blocks();
        end - start + if group == 0 { 1 } else { 0 }
    }

    /// The number of real blocks in a group.
    fn group_blocks(&self, group: u64) -> u64 {
        let start = self.first_data_block() + group * self.blocks_per_group as u64;
        core::cmp::min(self.blocks_per_group as u64, self.blocks_count as u64 - start)
    }

    /// Write a bitmap where the first `used` of `valid` bits are set, as well as the padding.
    fn bitmap(image: &mut [u8], block: u64, block_size: u64, used: u64, valid: u64) {
        let bits = &mut image[(block * block_size) as usize..((block + 1) * block_size) as usize];
        for pos in (0..used).chain(valid..block_size * 8) {
            bits[(pos / 8) as usize] |= 1 << (pos % 8);
        }
    }

    fn put(image: &mut [u8], ofs: u64, data: &[u8]) {
        image[ofs as usize..ofs as usize + data.len()].copy_from_slice(data);
    }

    /// Build the image.
    pub fn build(&self) -> Vec<u8> {
        let bs = self.block_size();
        let mut image = vec![0u8; (self.blocks_count as u64 * bs) as usize];

        let mut free_blocks = 0;
        let mut free_inodes = 0;
        for group in 0..self.group_count() {
            let used_blocks = self.used_blocks(group);
            let used_inodes = if group == 0 { FIRST_INO as u64 } else { 0 };
            let mut desc = self.desc(group);
            Self::bitmap(&mut image, desc.block_bitmap as u64, bs, used_blocks, self.group_blocks(group));
            Self::bitmap(&mut image, desc.inode_bitmap as u64, bs, used_inodes, self.inodes_per_group as u64);

            desc.free_blocks_count = (self.group_blocks(group) - used_blocks) as u16;
            desc.free_inodes_count = (self.inodes_per_group as u64 - used_inodes) as u16;
            desc.used_dirs_count = if group == 0 { 2 } else { 0 };
            free_blocks += desc.free_blocks_count as u32;
            free_inodes += desc.free_inodes_count as u32;

            let ofs = (self.first_data_block() + 1) * bs + group * GroupDesc::SIZE as u64;
            Self::put(&mut image, ofs, &desc.block_bitmap.to_le_bytes());
            Self::put(&mut image, ofs + 4, &desc.inode_bitmap.to_le_bytes());
            Self::put(&mut image, ofs + 8, &desc.inode_table.to_le_bytes());
            Self::put(&mut image, ofs + 12, &desc.free_blocks_count.to_le_bytes());
            Self::put(&mut image, ofs + 14, &desc.free_inodes_count.to_le_bytes());
            Self::put(&mut image, ofs + 16, &desc.used_dirs_count.to_le_bytes());
        }

        let sb = 1024;
        Self::put(&mut image, sb, &(self.inodes_count() as u32).to_le_bytes());
        Self::put(&mut image, sb + 0x04, &self.blocks_count.to_le_bytes());
        Self::put(&mut image, sb + 0x0c, &free_blocks.to_le_bytes());
        Self::put(&mut image, sb + 0x10, &free_inodes.to_le_bytes());
        Self::put(&mut image, sb + 0x14, &(self.first_data_block() as u32).to_le_bytes());
        Self::put(&mut image, sb + 0x18, &self.log_block_size.to_le_bytes());
        Self::put(&mut image, sb + 0x1c, &self.log_block_size.to_le_bytes());
        Self::put(&mut image, sb + 0x20, &self.blocks_per_group.to_le_bytes());
        Self::put(&mut image, sb + 0x24, &self.blocks_per_group.to_le_bytes());
        Self::put(&mut image, sb + 0x28, &self.inodes_per_group.to_le_bytes());
        Self::put(&mut image, sb + 0x38, &EXT2_MAGIC.to_le_bytes());
        Self::put(&mut image, sb + 0x3a, &1u16.to_le_bytes());
        Self::put(&mut image, sb + 0x4c, &1u32.to_le_bytes());
        Self::put(&mut image, sb + 0x54, &FIRST_INO.to_le_bytes());
        Self::put(&mut image, sb + 0x58, &self.inode_size.to_le_bytes());
        Self::put(&mut image, sb + 0x78, &self.label);

        // the root inode is the second one in the table
        let root = self.desc(0).inode_table as u64 * bs + self.inode_size as u64;
        Self::put(&mut image, root, &0o40755u16.to_le_bytes());
        Self::put(&mut image, root + 0x04, &(bs as u32).to_le_bytes());
        Self::put(&mut image, root + 0x1a, &3u16.to_le_bytes());
        Self::put(&mut image, root + 0x28, &(self.root_block() as u32).to_le_bytes());

        let mut ofs = self.root_block() * bs;
        let end = ofs + bs;
        for (i, (inode, file_type, name)) in self.root.iter().enumerate() {
            let mut rec_len = (8 + name.len() as u64).next_multiple_of(4);
            if i + 1 == self.root.len() {
                rec_len = end - ofs;
            }
            Self::put(&mut image, ofs, &inode.to_le_bytes());
            Self::put(&mut image, ofs + 4, &(rec_len as u16).to_le_bytes());
            Self::put(&mut image, ofs + 6, &[name.len() as u8, *file_type]);
            Self::put(&mut image, ofs + 8, name);
            ofs += rec_len;
        }
        image
    }
}
