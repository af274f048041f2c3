use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use crossterm::style::Stylize;
use fatarch::{
    cpu,
    fat::{self, DEFAULT_MAX_ARCH_COUNT},
    layout::{self, FAT_CIGAM, FAT_MAGIC},
    ByteOrder, FatParser, ParseError, ParseOptions, ParsedFatBinary, Source,
};
use inquire::Confirm;
use std::{
    fs::metadata,
    path::{Path, PathBuf},
    process::exit,
};

#[derive(Parser, Debug)]
#[command(version, about = "Inspect and split fat Mach-O containers")]
struct Args {
    #[command(subcommand)]
    command: Command,
    /// Largest architecture count accepted
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_ARCH_COUNT)]
    max_archs: u32,
    /// Reject slices overlapping each other or the header
    #[arg(long, global = true)]
    strict: bool,
    /// Only accept the big-endian magic 0xcafebabe
    #[arg(long, global = true)]
    no_swapped: bool,
    /// Read the file into memory instead of mapping it
    #[arg(long, global = true)]
    heap: bool,
    /// Print every step
    #[arg(long, short, global = true)]
    verbose: bool,
    /// Run without asking for confirmation
    #[arg(long, short('y'), global = true)]
    all_yes: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the header and every architecture
    Info {
        /// The fat file to inspect
        input_file: PathBuf,
    },
    /// Validate the file and exit non-zero if it is malformed
    Verify {
        /// The fat file to validate
        input_file: PathBuf,
    },
    /// Copy one architecture's slice to its own file
    Extract {
        /// The fat file to read
        input_file: PathBuf,
        /// Architecture name, e.g. arm64 or x86_64
        #[arg(long, short)]
        arch: String,
        /// Output path
        #[arg(short)]
        output_file: Option<PathBuf>,
    },
}

fn main() {
    let args = Args::parse();

    if let Err(e) = args.run() {
        eprintln!("{} {:#}", "error:".red().bold(), e);
        exit(1);
    }
}

trait Utils {
    fn ask_for_confirmation(&self, msg: &str) -> anyhow::Result<bool>;
    fn run(&self) -> anyhow::Result<()>;
    fn parse_options(&self) -> ParseOptions;
    fn load(&self, input_file: &Path) -> anyhow::Result<Source>;
    fn parse_fat<'a>(
        &self,
        input_file: &Path,
        source: &'a Source,
    ) -> anyhow::Result<ParsedFatBinary<'a>>;
    fn info(&self, input_file: &Path) -> anyhow::Result<()>;
    fn verify(&self, input_file: &Path) -> anyhow::Result<()>;
    fn extract(
        &self,
        input_file: &Path,
        arch: &str,
        output_file: Option<&Path>,
    ) -> anyhow::Result<()>;
}

impl Utils for Args {
    fn ask_for_confirmation(&self, msg: &str) -> anyhow::Result<bool> {
        if self.all_yes {
            return Ok(true);
        }

        Ok(Confirm::new(msg).with_default(true).prompt()?)
    }

    fn run(&self) -> anyhow::Result<()> {
        match &self.command {
            Command::Info { input_file } => self.info(input_file),
            Command::Verify { input_file } => self.verify(input_file),
            Command::Extract {
                input_file,
                arch,
                output_file,
            } => self.extract(input_file, arch, output_file.as_deref()),
        }
    }

    fn parse_options(&self) -> ParseOptions {
        let magics = if self.no_swapped {
            vec![FAT_MAGIC]
        } else {
            vec![FAT_MAGIC, FAT_CIGAM]
        };
        ParseOptions {
            magics,
            max_arch_count: self.max_archs,
            reject_overlaps: self.strict,
        }
    }

    fn load(&self, input_file: &Path) -> anyhow::Result<Source> {
        if !input_file.exists() {
            bail!("Input file `{}` does not exist", input_file.display());
        }
        if !metadata(input_file)?.is_file() {
            bail!("Input file `{}` is not a file", input_file.display());
        }

        let source = if self.heap {
            Source::read(input_file)
        } else {
            Source::open(input_file)
        }
        .with_context(|| format!("failed to read `{}`", input_file.display()))?;

        if self.verbose {
            match source.path() {
                Some(path) => println!(
                    "loaded {} bytes (mapped from `{}`)",
                    source.as_slice().len(),
                    path.display()
                ),
                None => println!("loaded {} bytes (heap)", source.as_slice().len()),
            }
        }
        Ok(source)
    }

    fn parse_fat<'a>(
        &self,
        input_file: &Path,
        source: &'a Source,
    ) -> anyhow::Result<ParsedFatBinary<'a>> {
        let data = source.as_slice();
        let parser = FatParser::new(self.parse_options());

        match parser.parse(data) {
            Ok(fat) => {
                if self.verbose {
                    let order = match fat.byte_order() {
                        ByteOrder::Big => "fat_be",
                        ByteOrder::Little => "fat_le",
                    };
                    println!("match {} file", order.red());
                    for (i, arch) in fat.arches().iter().enumerate() {
                        println!(
                            "arch {i}: {} [{:#x}, {:#x}) ok",
                            cpu::describe(arch.cpu_type(), arch.cpu_subtype()),
                            arch.offset(),
                            arch.end()
                        );
                    }
                }
                Ok(fat)
            }
            Err(ParseError::UnrecognizedMagic { magic }) if layout::is_thin_macho(magic) => {
                bail!(
                    "`{}` is a thin Mach-O ({:#x}), not a fat container",
                    input_file.display(),
                    magic
                )
            }
            Err(ParseError::UnrecognizedMagic { magic }) if fat::is_fat(data) => {
                bail!(
                    "`{}` has fat magic {:#x} which was not accepted (drop --no-swapped?)",
                    input_file.display(),
                    magic
                )
            }
            Err(e) => Err(e)
                .with_context(|| format!("`{}` is not a valid fat file", input_file.display())),
        }
    }

    fn info(&self, input_file: &Path) -> anyhow::Result<()> {
        let source = self.load(input_file)?;
        let fat = self.parse_fat(input_file, &source)?;
        let header = fat.header();

        println!(
            "{} {:#010x}, {} archs",
            "magic".bold(),
            header.magic(),
            header.arch_count()
        );
        for (i, arch) in fat.arches().iter().enumerate() {
            let name = arch
                .name()
                .map(str::to_string)
                .unwrap_or_else(|| "unknown".to_string());
            println!(
                "{:>3}  {:<10} cputype {:#x} subtype {:#x}  offset {:#x}  size {:#x}  align 2^{}",
                i,
                name.green(),
                arch.cpu_type(),
                arch.cpu_subtype(),
                arch.offset(),
                arch.size(),
                arch.align()
            );
        }
        Ok(())
    }

    fn verify(&self, input_file: &Path) -> anyhow::Result<()> {
        let source = self.load(input_file)?;
        let fat = self.parse_fat(input_file, &source)?;
        println!(
            "{}: {} archs, {}",
            input_file.display(),
            fat.len(),
            "ok".green().bold()
        );
        Ok(())
    }

    fn extract(
        &self,
        input_file: &Path,
        arch: &str,
        output_file: Option<&Path>,
    ) -> anyhow::Result<()> {
        if cpu::from_name(arch).is_none() {
            let known: Vec<_> = cpu::known_names().collect();
            bail!("unknown architecture `{}`, expected one of: {}", arch, known.join(", "));
        }

        let source = self.load(input_file)?;
        let fat = self.parse_fat(input_file, &source)?;

        let Some(descriptor) = fat.find_by_name(arch) else {
            let present: Vec<_> = fat
                .arches()
                .iter()
                .map(|a| cpu::describe(a.cpu_type(), a.cpu_subtype()))
                .collect();
            bail!(
                "no `{}` slice in `{}` (present: {})",
                arch,
                input_file.display(),
                present.join(", ")
            );
        };

        let output_file = output_file.map(Path::to_path_buf).unwrap_or_else(|| {
            let mut name = input_file.as_os_str().to_os_string();
            name.push(format!("_{arch}"));
            PathBuf::from(name)
        });
        if output_file.exists()
            && !self.ask_for_confirmation(&format!(
                "Output file `{}` already exists, overwrite?",
                output_file.display()
            ))?
        {
            return Ok(());
        }

        let Some(slice) = fat.slice_for(&descriptor) else {
            bail!("`{}` slice lies outside `{}`", arch, input_file.display());
        };
        std::fs::write(&output_file, slice)
            .with_context(|| format!("failed to write `{}`", output_file.display()))?;

        if self.verbose {
            println!(
                "writing {:#x} bytes at offset {:#x}",
                slice.len(),
                descriptor.offset()
            );
        }
        println!(
            "{} {} -> {}",
            "Done!".green().bold(),
            arch.red(),
            output_file.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_is_well_formed() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }

    #[test]
    fn flags_map_to_options() {
        let args = Args::parse_from([
            "fatarch",
            "--strict",
            "--no-swapped",
            "--max-archs",
            "4",
            "info",
            "x",
        ]);
        assert_eq!(
            args.parse_options(),
            ParseOptions {
                magics: vec![FAT_MAGIC],
                max_arch_count: 4,
                reject_overlaps: true,
            }
        );
        let args = Args::parse_from(["fatarch", "verify", "x"]);
        assert_eq!(args.parse_options(), ParseOptions::default());
    }
}
