use super::{command_block, post_command, pre_command, RenderRequest, RenderedScripts, SCRATCH, SHEBANG};

pub(super) fn render(request: &RenderRequest<'_>) -> RenderedScripts {
    let resources = request.resources;

    let mut lines = vec![SHEBANG.to_string()];
    if let Some(partition) = &resources.partition {
        lines.push(format!("#PBS -q {partition}"));
    }
    lines.push(format!("#PBS -N {}", request.name));
    lines.push(format!("#PBS -l nodes=1:ppn={}", resources.cores.max(1)));
    if let Some(time) = &resources.time {
        lines.push(format!("#PBS -l walltime={time}"));
    }
    if let Some(mem) = resources.mem {
        lines.push(format!("#PBS -l mem={mem}MB"));
    }
    lines.push(format!("#PBS -o {}", request.paths.stdout.display()));
    lines.push(format!("#PBS -e {}", request.paths.stderr.display()));
    lines.push(String::new());
    lines.push(SCRATCH.to_string());
    lines.push(pre_command(request));
    lines.push(command_block(request.command));
    lines.push(post_command().to_string());

    RenderedScripts {
        submission: lines.join("\n"),
        execution: None,
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{full_resources, paths, request};
    use super::*;
    use crate::backend::BackendKind;
    use crate::job::ResourceRequest;
    use pretty_assertions::assert_eq;

    #[test]
    fn single_file_holds_directives_and_body() {
        let resources = full_resources();
        let paths = paths(BackendKind::Torque);
        let rendered = render(&request(&resources, &paths));
        assert!(rendered.execution.is_none());

        let header: Vec<&str> = rendered.submission.lines().take(10).collect();
        assert_eq!(
            header,
            vec![
                "#!/bin/bash",
                "#PBS -q bigmem",
                "#PBS -N sample",
                "#PBS -l nodes=1:ppn=4",
                "#PBS -l walltime=01:00:00",
                "#PBS -l mem=2000MB",
                "#PBS -o /work/logs/sample.cluster.out",
                "#PBS -e /work/logs/sample.cluster.err",
                "",
                "mkdir -p $LOCAL_SCRATCH",
            ]
        );
    }

    #[test]
    fn minimal_request_keeps_node_line() {
        let resources = ResourceRequest::default();
        let paths = paths(BackendKind::Torque);
        let rendered = render(&request(&resources, &paths));
        assert!(rendered.submission.contains("#PBS -l nodes=1:ppn=1\n#PBS -o"));
    }
}
