//! Default values for serde deserialization.

/// Directory artifacts are written to.
pub const DEFAULT_OUTPUT_DIR: &str = "output";
/// Directory fingerprint records are kept in.
pub const DEFAULT_FINGERPRINT_DIR: &str = ".fingerprints";
/// File extension of compiled artifacts.
pub const DEFAULT_COMPILED_EXTENSION: &str = "srs";

macro_rules! default_string_fns {
    ($($fn_name:ident => $const_name:ident),* $(,)?) => {
        $(
            pub(crate) fn $fn_name() -> String {
                $const_name.to_string()
            }
        )*
    };
}

default_string_fns! {
    default_output_dir         => DEFAULT_OUTPUT_DIR,
    default_fingerprint_dir    => DEFAULT_FINGERPRINT_DIR,
    default_compiled_extension => DEFAULT_COMPILED_EXTENSION,
}
