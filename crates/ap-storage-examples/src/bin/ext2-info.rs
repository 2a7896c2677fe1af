//! Print the metadata of an ext2 image.
//!
//! Shows the superblock summary, every block group with its free block and
//! inode IDs, and the entries of the root directory.

use ap_storage::Error;
use ap_storage_ext2_ro::{bitmap::FreeRange, report::Report, ErrorKind, Ext2Image};
use ap_storage_linux::LinuxDisk;
use gumdrop::Options;
use log::LevelFilter;
use simple_logger::SimpleLogger;

#[derive(Debug, Options)]
struct CommandOptions {
    /// Print the help message.
    help: bool,

    /// The bytes to skip in the disk file.
    offset: u64,

    /// Print the report as JSON.
    json: bool,

    /// Skip the root directory.
    no_root: bool,

    /// Log the decoded structures.
    debug: bool,

    /// Log every group and directory entry.
    trace: bool,

    /// The disk image. Defaults to stdin.
    #[options(free)]
    image: Vec<String>,
}

/// Free IDs as a comma separated list.
fn ranges(v: &[FreeRange]) -> String {
    v.iter().map(|r| r.to_string()).collect::<Vec<_>>().join(", ")
}

fn print_text(report: &Report) {
    let s = &report.summary;
    println!("--General File System Information--");
    println!("Block Size in Bytes: {}", s.block_size);
    println!("Total Number of Blocks: {}", s.blocks_count);
    println!("Disk Size in Bytes: {}", s.disk_size);
    println!("Maximum Number of Blocks Per Group: {}", s.blocks_per_group);
    println!("Inode Size in Bytes: {}", s.inode_size);
    println!("Number of Inodes Per Group: {}", s.inodes_per_group);
    println!("Number of Inode Blocks Per Group: {}", s.inode_table_blocks);
    println!("Number of Groups: {}", s.group_count);
    println!("Total Number of Inodes: {}", s.inodes_count);
    println!("Number of Free Inodes: {}", s.free_inodes_count);
    println!("Number of Free Blocks: {}", s.free_blocks_count);
    if !s.volume_name.is_empty() {
        println!("Volume Name: {}", s.volume_name);
    }

    println!();
    println!("--Individual Group Information--");
    for g in &report.groups {
        println!("-Group {}-", g.index);
        println!("Block IDs: {}", g.blocks);
        println!("Block Bitmap Block ID: {}", g.desc.block_bitmap);
        println!("Inode Bitmap Block ID: {}", g.desc.inode_bitmap);
        println!("Inode Table Block ID: {}", g.desc.inode_table);
        println!("Number of Free Blocks: {}", g.desc.free_blocks_count);
        println!("Number of Free Inodes: {}", g.desc.free_inodes_count);
        println!("Number of Directories: {}", g.desc.used_dirs_count);
        println!("Free Block IDs: {}", ranges(&g.free_blocks));
        println!("Free Inode IDs: {}", ranges(&g.free_inodes));
    }

    if report.root.is_empty() {
        return;
    }
    println!();
    println!("--Root Directory Entries--");
    for e in &report.root {
        println!("Inode: {}", e.inode);
        println!("Entry Length: {}", e.rec_len);
        println!("Name Length: {}", e.name_len);
        println!("File Type: {}", e.file_type);
        println!("Name: {}", e.name_lossy());
        println!();
    }
}

fn main() -> Result<(), Error> {
    let opts = CommandOptions::parse_args_default_or_exit();
    let level = match (opts.trace, opts.debug) {
        (true, _) => LevelFilter::Trace,
        (_, true) => LevelFilter::Debug,
        _ => LevelFilter::Warn,
    };
    SimpleLogger::new()
        .with_level(level)
        .init()
        .map_err(|e| anyhow::anyhow!("logger: {e}"))?;

    let filename = opts.image.first().map(String::as_str).unwrap_or("/dev/stdin");
    let disk = LinuxDisk::new(filename, opts.offset)?;
    let report = Ext2Image::new(&disk)
        .and_then(|fs| fs.report_with(!opts.no_root))
        .map_err(|e| {
            log::error!("{:?} while decoding {filename}", ErrorKind::of(&e));
            e
        })?;

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_text(&report);
    }
    Ok(())
}
