// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared helpers: temporary projects and assertions on `rln` runs.

use std::path::{Path, PathBuf};
use std::process::Output;

use tempfile::TempDir;

/// Two jobs: a finished import feeding a motion correction that is still
/// running.
pub const TWO_JOB_PIPELINE: &str = r#"
# version 50001

data_pipeline_general

_rlnPipeLineJobCounter                       3

# version 50001

data_pipeline_processes

loop_
_rlnPipeLineProcessName #1
_rlnPipeLineProcessAlias #2
_rlnPipeLineProcessTypeLabel #3
_rlnPipeLineProcessStatusLabel #4
Import/job001/       None relion.import.movies  Succeeded
MotionCorr/job002/   None relion.motioncorr.own Running

# version 50001

data_pipeline_nodes

loop_
_rlnPipeLineNodeName #1
_rlnPipeLineNodeTypeLabel #2
_rlnPipeLineNodeTypeLabelDepth #3
Import/job001/movies.star MicrographMovieGroupMetadata.star.relion 1
MotionCorr/job002/corrected_micrographs.star MicrographGroupMetadata.star.relion.motioncorr 1

# version 50001

data_pipeline_input_edges

loop_
_rlnPipeLineEdgeFromNode #1
_rlnPipeLineEdgeProcess #2
Import/job001/movies.star MotionCorr/job002/

# version 50001

data_pipeline_output_edges

loop_
_rlnPipeLineEdgeProcess #1
_rlnPipeLineEdgeToNode #2
Import/job001/ Import/job001/movies.star
MotionCorr/job002/ MotionCorr/job002/corrected_micrographs.star
"#;

pub const IMPORT_JOB_STAR: &str = r#"
# version 50001

data_job

_rlnJobTypeLabel             relion.import.movies
_rlnJobIsContinue                       0
_rlnJobIsTomo                           0

# version 50001

data_joboptions_values

loop_
_rlnJobOptionVariable #1
_rlnJobOptionValue #2
fn_in_raw     Movies/*.tiff
angpix        0.885
"#;

pub const MOTIONCORR_JOB_STAR: &str = r#"
# version 50001

data_job

_rlnJobTypeLabel             relion.motioncorr.own
_rlnJobIsContinue                       0
_rlnJobIsTomo                           0

# version 50001

data_joboptions_values

loop_
_rlnJobOptionVariable #1
_rlnJobOptionValue #2
input_star_mics  Import/job001/movies.star
bin_factor       1
"#;

/// Per-job rows of the motion correction, linking it to the import.
pub const MOTIONCORR_JOB_PIPELINE: &str = r#"
# version 50001

data_pipeline_processes

loop_
_rlnPipeLineProcessName #1
_rlnPipeLineProcessAlias #2
_rlnPipeLineProcessTypeLabel #3
_rlnPipeLineProcessStatusLabel #4
MotionCorr/job002/   None relion.motioncorr.own Running

# version 50001

data_pipeline_input_edges

loop_
_rlnPipeLineEdgeFromNode #1
_rlnPipeLineEdgeProcess #2
Import/job001/movies.star MotionCorr/job002/
"#;

/// A temporary directory the CLI runs in.
pub struct Project {
    dir: TempDir,
}

impl Project {
    pub fn empty() -> Self {
        Self { dir: TempDir::new().unwrap() }
    }

    /// Project with [`TWO_JOB_PIPELINE`], both job directories and a success
    /// marker on the import.
    pub fn two_jobs() -> Self {
        let project = Self::empty();
        project.file("default_pipeline.star", TWO_JOB_PIPELINE);
        project.file("Import/job001/job.star", IMPORT_JOB_STAR);
        project.file("Import/job001/movies.star", "");
        project.file("Import/job001/RELION_JOB_EXIT_SUCCESS", "");
        project.file("MotionCorr/job002/job.star", MOTIONCORR_JOB_STAR);
        project.file("MotionCorr/job002/job_pipeline.star", MOTIONCORR_JOB_PIPELINE);
        project
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn join(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    pub fn file(&self, rel: &str, content: &str) {
        let path = self.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    /// `rln` with this project as its working directory.
    pub fn rln(&self) -> CliBuilder {
        let mut builder = cli();
        builder.cmd.current_dir(self.path());
        builder
    }
}

pub fn cli() -> CliBuilder {
    let mut cmd = assert_cmd::Command::cargo_bin("rln").expect("rln binary is built with the workspace");
    cmd.env("NO_COLOR", "1").env_remove("RLN_LOG").env("RLN_CONFIG_DIR", "/nonexistent");
    CliBuilder { cmd }
}

pub struct CliBuilder {
    cmd: assert_cmd::Command,
}

impl CliBuilder {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn passes(mut self) -> RunAssert {
        let output = self.cmd.output().unwrap();
        let run = RunAssert { output };
        assert!(
            run.output.status.success(),
            "expected success, got {:?}\nstdout:\n{}\nstderr:\n{}",
            run.output.status.code(),
            run.stdout(),
            run.stderr()
        );
        run
    }

    pub fn fails(mut self) -> RunAssert {
        let output = self.cmd.output().unwrap();
        let run = RunAssert { output };
        assert!(!run.output.status.success(), "expected failure\nstdout:\n{}", run.stdout());
        run
    }
}

pub struct RunAssert {
    output: Output,
}

impl RunAssert {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }

    pub fn stdout_has(self, needle: &str) -> Self {
        let stdout = self.stdout();
        assert!(stdout.contains(needle), "stdout lacks {needle:?}:\n{stdout}");
        self
    }

    pub fn stdout_lacks(self, needle: &str) -> Self {
        let stdout = self.stdout();
        assert!(!stdout.contains(needle), "stdout has {needle:?}:\n{stdout}");
        self
    }

    pub fn stdout_eq(self, expected: &str) -> Self {
        similar_asserts::assert_eq!(self.stdout(), expected);
        self
    }

    pub fn stderr_has(self, needle: &str) -> Self {
        let stderr = self.stderr();
        assert!(stderr.contains(needle), "stderr lacks {needle:?}:\n{stderr}");
        self
    }

    pub fn code(self, code: i32) -> Self {
        assert_eq!(self.output.status.code(), Some(code), "stderr:\n{}", self.stderr());
        self
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.output.stdout).unwrap()
    }
}
