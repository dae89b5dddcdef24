//! Binary diatonic key templates
//!
//! Each template marks the seven scale degrees of a key with 1 and the other
//! five pitch classes with 0. Templates for every root are rotations of the
//! C-rooted profiles.

/// C major scale degrees: C D E F G A B
pub const MAJOR_PROFILE: [f32; 12] = [1.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0];

/// C natural minor scale degrees: C D Eb F G Ab Bb
pub const MINOR_PROFILE: [f32; 12] = [1.0, 0.0, 1.0, 1.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0, 0.0];

/// Key templates for all 24 keys
#[derive(Debug, Clone)]
pub struct KeyTemplates {
    /// Major key templates (index = root: C, C#, D, ..., B)
    pub major: [[f32; 12]; 12],

    /// Minor key templates (index = root: C, C#, D, ..., B)
    pub minor: [[f32; 12]; 12],
}

impl KeyTemplates {
    /// Build the 24 templates by rotating the C-rooted profiles
    pub fn new() -> Self {
        let mut major = [[0.0f32; 12]; 12];
        let mut minor = [[0.0f32; 12]; 12];
        for root in 0..12 {
            major[root] = rotate(&MAJOR_PROFILE, root);
            minor[root] = rotate(&MINOR_PROFILE, root);
        }
        Self { major, minor }
    }

    /// Template for the major key rooted at `root` (0 = C)
    pub fn get_major_template(&self, root: u32) -> &[f32; 12] {
        &self.major[root as usize % 12]
    }

    /// Template for the minor key rooted at `root` (0 = C)
    pub fn get_minor_template(&self, root: u32) -> &[f32; 12] {
        &self.minor[root as usize % 12]
    }
}

impl Default for KeyTemplates {
    fn default() -> Self {
        Self::new()
    }
}

/// Shift a C-rooted profile so that its tonic lands on `root`
fn rotate(profile: &[f32; 12], root: usize) -> [f32; 12] {
    let mut out = [0.0f32; 12];
    for (i, &v) in profile.iter().enumerate() {
        out[(i + root) % 12] = v;
    }
    out
}
