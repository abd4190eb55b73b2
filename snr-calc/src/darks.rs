//! Master dark from dark files on disk.

use shared::dark_frame::{DarkError, DarkStack, MasterDark};
use shared::image_proc::io::FrameStore;
use std::path::Path;
use tracing::{debug, warn};

/// Load every dark file through `store` and average them.
///
/// Files that fail to load or whose dimensions disagree with the first loaded
/// dark are logged and skipped. Returns [`DarkError::NoDarkFrames`] if no file
/// survives.
pub fn load_master_dark<S: FrameStore>(
    files: &[&Path],
    store: &S,
) -> Result<MasterDark, DarkError> {
    let mut stack = DarkStack::new();

    for path in files {
        let frame = match store.load(path) {
            Ok(frame) => frame,
            Err(e) => {
                warn!("Skipping dark frame: {e}");
                continue;
            }
        };

        if let Err(e) = stack.add_frame(&frame) {
            warn!("Skipping dark frame {}: {e}", path.display());
        }
    }

    let skipped = files.len() - stack.num_frames();
    let master = stack.finalize()?;
    debug!(
        "Master dark from {} of {} dark frames ({} skipped)",
        master.num_frames(),
        files.len(),
        skipped
    );
    Ok(master)
}
