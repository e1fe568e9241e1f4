//! Process exit codes, following BSD sysexits.h

pub const OK: i32 = 0;

/// Bad arguments or no data file to work on
pub const USAGE: i32 = 64;

/// Data file parsed but does not form a valid hierarchy, or failed to parse
pub const DATAERR: i32 = 65;

/// Data file does not exist
pub const NOINPUT: i32 = 66;

pub const SOFTWARE: i32 = 70;

/// Writing to stdout failed
pub const IOERR: i32 = 74;

/// Settings file missing, malformed or invalid
pub const CONFIG: i32 = 78;
