use std::{
    fs::{self, File},
    io::{self, BufWriter, StdoutLock, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context;

use crate::schema::DriverConfig;

#[derive(Debug)]
pub enum Output {
    Stdout {
        writer: StdoutLock<'static>,
    },
    File {
        writer: BufWriter<File>,
        path: PathBuf,
    },
}

impl Output {
    pub fn from_output_path(output_path: Option<PathBuf>) -> anyhow::Result<Self> {
        match output_path {
            Some(path) => Output::open(path),
            None => Ok(Output::stdout()),
        }
    }

    pub fn stdout() -> Self {
        Output::Stdout {
            writer: io::stdout().lock(),
        }
    }

    pub fn open(path: PathBuf) -> anyhow::Result<Self> {
        let file = File::create(&path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Output::File {
            writer: BufWriter::new(file),
            path,
        })
    }

    pub fn display_path(&self) -> String {
        match self {
            Output::Stdout { .. } => "stdout".to_string(),
            Output::File { path, .. } => path.display().to_string(),
        }
    }

    /// Writes `value` as pretty-printed JSON followed by a newline.
    pub fn write_json<T>(&mut self, value: &T) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        serde_json::to_writer_pretty(&mut *self, value)
            .with_context(|| format!("Failed to write JSON to {}", self.display_path()))?;
        self.finish_line()
    }

    /// Writes `value` as a single JSON line.
    pub fn write_json_line<T>(&mut self, value: &T) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        serde_json::to_writer(&mut *self, value)
            .with_context(|| format!("Failed to write JSON to {}", self.display_path()))?;
        self.finish_line()
    }

    fn finish_line(&mut self) -> anyhow::Result<()> {
        writeln!(&mut *self).with_context(|| {
            format!(
                "Failed to write newline after JSON to {}",
                self.display_path()
            )
        })?;
        self.flush()
            .with_context(|| format!("Failed to flush output to {}", self.display_path()))?;
        Ok(())
    }
}

impl io::Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Stdout { writer } => writer.write(buf),
            Output::File { writer, .. } => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stdout { writer } => writer.flush(),
            Output::File { writer, .. } => writer.flush(),
        }
    }
}

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} file: {}", file_kind, path.display()))?;

    let reader = io::BufReader::new(file);
    let value = serde_json::from_reader(reader).with_context(|| {
        format!(
            "Failed to parse {} JSON file: {}",
            file_kind,
            path.display()
        )
    })?;

    Ok(value)
}

/// Reads the driver configuration, or the defaults when no path is given.
pub fn read_config_file(path: Option<&Path>) -> anyhow::Result<DriverConfig> {
    let Some(path) = path else {
        return Ok(DriverConfig::default());
    };
    let config: DriverConfig = read_json_file("config", path)?;
    config
        .engine
        .validate()
        .with_context(|| format!("Invalid engine config in {}", path.display()))?;
    Ok(config)
}

pub fn read_script_file(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path)
        .with_context(|| format!("Failed to read script file: {}", path.display()))
}
