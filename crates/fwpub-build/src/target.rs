use std::fmt;

/// Fully qualified board name plus its option table.
///
/// Rendered as `vendor:arch:board:Key=Value,Key=Value,...`, the form the
/// board toolchain takes for `--fqbn`. Option order is preserved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TargetDescriptor {
    pub board: String,
    pub options: Vec<(String, String)>,
}

impl TargetDescriptor {
    pub fn new(board: impl Into<String>) -> Self {
        Self {
            board: board.into(),
            options: Vec::new(),
        }
    }

    pub fn option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.push((key.into(), value.into()));
        self
    }

    /// The ESP32-C3 configuration every supported device is built with:
    /// 160 MHz, 4 MB DIO flash at 80 MHz, custom partition table, errors-only
    /// debug output.
    pub fn esp32c3() -> Self {
        Self::new("esp32:esp32:esp32c3")
            .option("CDCOnBoot", "cdc")
            .option("CPUFreq", "160")
            .option("DebugLevel", "error")
            .option("EraseFlash", "all")
            .option("FlashFreq", "80")
            .option("FlashMode", "dio")
            .option("FlashSize", "4M")
            .option("JTAGAdapter", "default")
            .option("PartitionScheme", "custom")
            .option("UploadSpeed", "921600")
            .option("ZigbeeMode", "default")
    }

    /// Descriptor for a device model. All current models share one board.
    pub fn for_model(_model: &str) -> Self {
        Self::esp32c3()
    }

    /// Look up an option value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// The `--fqbn` argument.
    pub fn fqbn(&self) -> String {
        if self.options.is_empty() {
            return self.board.clone();
        }
        let opts: Vec<String> = self
            .options
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        format!("{}:{}", self.board, opts.join(","))
    }
}

impl fmt::Display for TargetDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fqbn())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn esp32c3_fqbn() {
        assert_eq!(
            TargetDescriptor::esp32c3().fqbn(),
            "esp32:esp32:esp32c3:CDCOnBoot=cdc,CPUFreq=160,DebugLevel=error,EraseFlash=all,\
             FlashFreq=80,FlashMode=dio,FlashSize=4M,JTAGAdapter=default,\
             PartitionScheme=custom,UploadSpeed=921600,ZigbeeMode=default"
        );
    }

    #[test]
    fn bare_board() {
        assert_eq!(TargetDescriptor::new("esp32:esp32:esp32").fqbn(), "esp32:esp32:esp32");
    }

    #[test]
    fn option_lookup() {
        let t = TargetDescriptor::for_model("hoRelay2");
        assert_eq!(t.get("PartitionScheme"), Some("custom"));
        assert_eq!(t.get("Missing"), None);
    }
}
