//! SD card file source
//!
//! FAT volume access through `embedded-sdmmc`'s handle-based API. The card
//! driver is blocking; reads are short and happen on the audio core only.

use embedded_sdmmc::{
    BlockDevice, Error as SdError, Mode, RawDirectory, RawFile, TimeSource, Timestamp, VolumeIdx,
    VolumeManager,
};

use tactus_hal::{FileSource, StorageError};

fn map_error<E: core::fmt::Debug>(e: SdError<E>) -> StorageError {
    match e {
        SdError::NotFound => StorageError::NotFound,
        _ => StorageError::Device,
    }
}

/// Fixed timestamp for a read-only filesystem user
pub struct FixedTime;

impl TimeSource for FixedTime {
    fn get_timestamp(&self) -> Timestamp {
        // 2024-01-01 00:00:00
        Timestamp {
            year_since_1970: 54,
            zero_indexed_month: 0,
            zero_indexed_day: 0,
            hours: 0,
            minutes: 0,
            seconds: 0,
        }
    }
}

/// First FAT volume of a card, opened read-only
pub struct SdCardFiles<D: BlockDevice, T: TimeSource> {
    volumes: VolumeManager<D, T>,
    root: RawDirectory,
}

impl<D: BlockDevice, T: TimeSource> SdCardFiles<D, T> {
    /// Open volume 0 and its root directory
    pub fn mount(device: D, time: T) -> Result<Self, StorageError> {
        let mut volumes = VolumeManager::new(device, time);
        let volume = volumes.open_raw_volume(VolumeIdx(0)).map_err(map_error)?;
        let root = volumes.open_root_dir(volume).map_err(map_error)?;
        Ok(Self { volumes, root })
    }

    /// Walk `/`-separated directories below the root and open the leaf file
    fn open_path(&mut self, path: &str) -> Result<RawFile, StorageError> {
        let path = path.trim_start_matches('/');
        let (dirs, name) = path.rsplit_once('/').unwrap_or(("", path));
        if name.is_empty() {
            return Err(StorageError::NotFound);
        }

        let mut parent: Option<RawDirectory> = None;
        for part in dirs.split('/').filter(|p| !p.is_empty()) {
            let opened = self.volumes.open_dir(parent.unwrap_or(self.root), part);
            if let Some(dir) = parent.take() {
                let _ = self.volumes.close_dir(dir);
            }
            parent = Some(opened.map_err(map_error)?);
        }

        let file = self
            .volumes
            .open_file_in_dir(parent.unwrap_or(self.root), name, Mode::ReadOnly);
        if let Some(dir) = parent {
            let _ = self.volumes.close_dir(dir);
        }
        file.map_err(map_error)
    }
}

impl<D: BlockDevice, T: TimeSource> FileSource for SdCardFiles<D, T> {
    type Handle = RawFile;

    async fn open(&mut self, path: &str) -> Result<RawFile, StorageError> {
        self.open_path(path)
    }

    async fn read(&mut self, file: RawFile, buf: &mut [u8]) -> Result<usize, StorageError> {
        match self.volumes.read(file, buf) {
            Err(SdError::EndOfFile) => Ok(0),
            other => other.map_err(map_error),
        }
    }

    async fn seek(&mut self, file: RawFile, offset: i32) -> Result<(), StorageError> {
        self.volumes
            .file_seek_from_current(file, offset)
            .map_err(map_error)
    }

    async fn close(&mut self, file: RawFile) -> Result<(), StorageError> {
        self.volumes.close_file(file).map_err(map_error)
    }
}
