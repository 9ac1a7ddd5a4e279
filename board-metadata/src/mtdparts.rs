//! # MTD partition tables
//!
//! Flash partitions are described in the kernel's `mtdparts` notation:
//!
//! ```text
//! physmap-flash:256k(U-Boot),128k(Environment),4M(Kernel),-(RestOfNor0)
//! ```
//!
//! Every partition has a size with an optional `k`, `M` or `G` suffix, or `-`
//! to take the remaining space of the device. Partitions are laid out back to
//! back from the start of the device, and the remainder partition, if any,
//! has to be the last one.

use std::fmt;

use crate::Error;

/// Size of a partition as written in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionSize {
    Fixed(u32),
    /// Everything up to the end of the device.
    Remainder,
}

/// A partition as written in the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionSpec {
    pub name: String,
    pub size: PartitionSize,
}

/// A partition placed on its device.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Partition {
    pub name: String,
    pub offset: u32,
    pub size: u32,
    /// The partition absorbs the rest of the device.
    pub remainder: bool,
}

impl Partition {
    /// One past the last byte of the partition.
    pub fn end(&self) -> u64 {
        u64::from(self.offset) + u64::from(self.size)
    }
}

/// The partitions of one MTD device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionTable {
    pub device: String,
    pub partitions: Vec<PartitionSpec>,
}

impl PartitionTable {
    /// Parse a full `<device>:<partitions>` definition.
    pub fn parse(mtdparts: &str) -> Result<Self, Error> {
        let Some((device, partitions)) = mtdparts.split_once(':') else {
            return Err(Error::partition(mtdparts, "missing ':' after the device name"));
        };

        Self::parse_partitions(device, partitions)
    }

    /// Parse the comma separated partitions of `device`.
    pub fn parse_partitions(device: &str, partitions: &str) -> Result<Self, Error> {
        if device.is_empty() {
            return Err(Error::partition(device, "empty device name"));
        }

        let partitions = partitions
            .split(',')
            .map(|part| parse_partition(device, part.trim()))
            .collect::<Result<Vec<_>, _>>()?;

        let table = Self {
            device: device.to_string(),
            partitions,
        };
        table.check_layout()?;

        Ok(table)
    }

    fn check_layout(&self) -> Result<(), Error> {
        if let Some(position) = self
            .partitions
            .iter()
            .position(|p| p.size == PartitionSize::Remainder)
        {
            if position != self.partitions.len() - 1 {
                return Err(Error::partition(
                    &self.device,
                    format!(
                        "'{}' takes the remaining space but is not the last partition",
                        self.partitions[position].name
                    ),
                ));
            }
        }

        for (i, partition) in self.partitions.iter().enumerate() {
            if self.partitions[..i].iter().any(|p| p.name == partition.name) {
                return Err(Error::partition(
                    &self.device,
                    format!("duplicate partition name '{}'", partition.name),
                ));
            }
        }

        Ok(())
    }

    /// Sum of all fixed partition sizes.
    pub fn fixed_size(&self) -> u64 {
        self.partitions
            .iter()
            .map(|p| match p.size {
                PartitionSize::Fixed(size) => u64::from(size),
                PartitionSize::Remainder => 0,
            })
            .sum()
    }

    /// Number of partitions taking the rest of the device.
    pub fn remainder_count(&self) -> usize {
        self.partitions
            .iter()
            .filter(|p| p.size == PartitionSize::Remainder)
            .count()
    }

    /// Place every partition on a device of `device_size` bytes.
    ///
    /// Fails if the fixed partitions do not fit on the device.
    pub fn resolve(&self, device_size: u32) -> Result<Vec<Partition>, Error> {
        let fixed = self.fixed_size();
        if fixed > u64::from(device_size) {
            return Err(Error::partition(
                &self.device,
                format!("partitions need {fixed:#x} bytes, the device has {device_size:#x}"),
            ));
        }

        let mut offset = 0u32;
        let mut placed = Vec::with_capacity(self.partitions.len());
        for spec in &self.partitions {
            let (size, remainder) = match spec.size {
                PartitionSize::Fixed(size) => (size, false),
                PartitionSize::Remainder => (device_size - offset, true),
            };

            placed.push(Partition {
                name: spec.name.clone(),
                offset,
                size,
                remainder,
            });
            // `fixed <= device_size` keeps this in range.
            offset += size;
        }

        Ok(placed)
    }
}

impl fmt::Display for PartitionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.device)?;
        for (i, partition) in self.partitions.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            match partition.size {
                PartitionSize::Fixed(size) => write!(f, "{}", format_size(size))?,
                PartitionSize::Remainder => write!(f, "-")?,
            }
            write!(f, "({})", partition.name)?;
        }

        Ok(())
    }
}

/// The `mtdids` entry mapping an MTD id to its device, e.g.
/// `nor0=physmap-flash`.
pub fn mtdids(id: &str, device: &str) -> String {
    format!("{id}={device}")
}

fn parse_partition(device: &str, part: &str) -> Result<PartitionSpec, Error> {
    let Some((size, rest)) = part.split_once('(') else {
        return Err(Error::partition(
            device,
            format!("partition '{part}' has no name"),
        ));
    };
    let Some(name) = rest.strip_suffix(')') else {
        return Err(Error::partition(
            device,
            format!("partition '{part}' is missing a closing ')'"),
        ));
    };
    if name.is_empty() {
        return Err(Error::partition(device, "empty partition name"));
    }
    if size.contains('@') {
        return Err(Error::partition(
            device,
            format!("partition '{name}': explicit offsets are not supported"),
        ));
    }

    let size = match size {
        "-" => PartitionSize::Remainder,
        size => PartitionSize::Fixed(parse_size(size).ok_or_else(|| {
            Error::partition(device, format!("partition '{name}' has invalid size '{size}'"))
        })?),
    };

    if size == PartitionSize::Fixed(0) {
        return Err(Error::partition(
            device,
            format!("partition '{name}' is empty"),
        ));
    }

    Ok(PartitionSpec {
        name: name.to_string(),
        size,
    })
}

fn parse_size(size: &str) -> Option<u32> {
    let (digits, shift) = match size.as_bytes().last()? {
        b'k' | b'K' => (&size[..size.len() - 1], 10),
        b'm' | b'M' => (&size[..size.len() - 1], 20),
        b'g' | b'G' => (&size[..size.len() - 1], 30),
        _ => (size, 0),
    };

    let value = match digits.strip_prefix("0x") {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => digits.parse::<u32>().ok()?,
    };

    value.checked_mul(1 << shift)
}

fn format_size(size: u32) -> String {
    const G: u32 = 1 << 30;
    const M: u32 = 1 << 20;
    const K: u32 = 1 << 10;

    match size {
        size if size % G == 0 => format!("{}G", size / G),
        size if size % M == 0 => format!("{}M", size / M),
        size if size % K == 0 => format!("{}k", size / K),
        size => size.to_string(),
    }
}
