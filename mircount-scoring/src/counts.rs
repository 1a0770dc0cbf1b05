use std::fmt::Display;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::ops::Add;
use std::path::Path;

use flate2::Compression;
use flate2::write::GzEncoder;
use fxhash::FxHashMap;

use mircount_core::errors::{CountingError, CountingResult};

///
/// A dense, labelled matrix. Rows are features (or offsets, or references),
/// columns are samples.
///
#[derive(Debug, Clone)]
pub struct CountMatrix<T> {
    data: Vec<T>,
    rows: usize,
    cols: usize,
    row_names: Vec<String>,
    col_names: Vec<String>,
    row_lookup: FxHashMap<String, usize>,
}

impl<T> CountMatrix<T>
where
    T: Copy + Default + Add<Output = T>,
{
    pub fn new(row_names: Vec<String>, col_names: Vec<String>) -> Self {
        let rows = row_names.len();
        let cols = col_names.len();

        let mut row_lookup = FxHashMap::default();
        for (i, name) in row_names.iter().enumerate() {
            row_lookup.entry(name.clone()).or_insert(i);
        }

        Self {
            data: vec![T::default(); rows * cols],
            rows,
            cols,
            row_names,
            col_names,
            row_lookup,
        }
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        if row < self.rows && col < self.cols {
            self.data.get(row * self.cols + col)
        } else {
            None
        }
    }

    pub fn set(&mut self, row: usize, col: usize, value: T) -> CountingResult<()> {
        if row < self.rows && col < self.cols {
            self.data[row * self.cols + col] = value;
            Ok(())
        } else {
            Err(CountingError::IndexOutOfBounds { row, col })
        }
    }

    /// Look a value up by its row and column labels.
    pub fn get_by_name(&self, row: &str, col: &str) -> Option<&T> {
        let r = self.row_index(row)?;
        let c = self.col_index(col)?;
        self.get(r, c)
    }

    pub fn row_index(&self, name: &str) -> Option<usize> {
        self.row_lookup.get(name).copied()
    }

    pub fn col_index(&self, name: &str) -> Option<usize> {
        self.col_names.iter().position(|c| c == name)
    }

    ///
    /// Append an all-default row and return its index. Used when a sample
    /// reports a label that wasn't known when the matrix was created.
    ///
    pub fn push_row(&mut self, name: &str) -> usize {
        let idx = self.rows;
        self.data.extend(std::iter::repeat_n(T::default(), self.cols));
        self.row_names.push(name.to_string());
        self.row_lookup.entry(name.to_string()).or_insert(idx);
        self.rows += 1;
        idx
    }

    pub fn column(&self, col: usize) -> impl Iterator<Item = T> + '_ {
        (0..self.rows).map(move |r| self.data[r * self.cols + col])
    }

    pub fn column_sum(&self, col: usize) -> T {
        if col >= self.cols {
            return T::default();
        }
        self.column(col).fold(T::default(), |acc, v| acc + v)
    }

    pub fn row_names(&self) -> &[String] {
        &self.row_names
    }

    pub fn col_names(&self) -> &[String] {
        &self.col_names
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }
}

impl<T> CountMatrix<T>
where
    T: Copy + Default + Add<Output = T> + Display,
{
    ///
    /// Write the matrix as a tab-separated table with a header line.
    /// `corner` labels the row-name column. Paths ending in `.gz` are
    /// gzip-compressed.
    ///
    pub fn write_to_file(&self, path: &Path, corner: &str) -> CountingResult<()> {
        let file = File::create(path)?;

        let is_gzipped = path.extension().is_some_and(|ext| ext == "gz");
        let writer: Box<dyn Write> = if is_gzipped {
            Box::new(GzEncoder::new(file, Compression::default()))
        } else {
            Box::new(file)
        };
        let mut writer = BufWriter::new(writer);

        self.write_table(&mut writer, corner)?;
        writer.flush()?;

        Ok(())
    }

    pub fn write_table<W: Write>(&self, writer: &mut W, corner: &str) -> CountingResult<()> {
        write!(writer, "{}", corner)?;
        for name in &self.col_names {
            write!(writer, "\t{}", name)?;
        }
        writeln!(writer)?;

        for (r, name) in self.row_names.iter().enumerate() {
            write!(writer, "{}", name)?;
            for c in 0..self.cols {
                write!(writer, "\t{}", self.data[r * self.cols + c])?;
            }
            writeln!(writer)?;
        }

        Ok(())
    }
}
