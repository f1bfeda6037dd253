use super::{command_block, post_command, pre_command, shell_quote, RenderRequest, RenderedScripts, SCRATCH, SHEBANG};

pub(super) fn render(request: &RenderRequest<'_>) -> RenderedScripts {
    let resources = request.resources;
    let paths = request.paths;
    let exec_path = paths.execution.as_ref().unwrap_or(&paths.submission);

    let mut submission = vec![SHEBANG.to_string()];
    if let Some(partition) = &resources.partition {
        submission.push(format!("#SBATCH -p {partition}"));
    }
    submission.push(format!("#SBATCH -J {}", request.name));
    submission.push("#SBATCH --ntasks 1".to_string());
    submission.push(format!("#SBATCH --cpus-per-task {}", resources.cores.max(1)));
    if let Some(time) = &resources.time {
        submission.push(format!("#SBATCH --time={time}"));
    }
    if let Some(mem) = resources.mem {
        submission.push(format!("#SBATCH --mem={mem}"));
    }
    submission.push(format!("#SBATCH -o {}", paths.stdout.display()));
    submission.push(format!("#SBATCH -e {}", paths.stderr.display()));
    submission.push(format!(
        "cd {}",
        shell_quote(&request.run_dir.display().to_string())
    ));
    submission.push(format!(
        "srun bash {}",
        shell_quote(&exec_path.display().to_string())
    ));

    let execution = [
        SHEBANG.to_string(),
        SCRATCH.to_string(),
        pre_command(request),
        command_block(request.command),
        post_command().to_string(),
    ];

    RenderedScripts {
        submission: submission.join("\n"),
        execution: Some(execution.join("\n")),
    }
}
