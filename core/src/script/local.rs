use super::{command_block, post_command, pre_command, RenderRequest, RenderedScripts, SHEBANG};

/// Resource directives mean nothing to the local pool; only the wrapper is emitted.
pub(super) fn render(request: &RenderRequest<'_>) -> RenderedScripts {
    let lines = [
        SHEBANG.to_string(),
        String::new(),
        pre_command(request),
        command_block(request.command),
        post_command().to_string(),
    ];
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
    use pretty_assertions::assert_eq;

    #[test]
    fn plain_script_without_directives() {
        let resources = full_resources();
        let paths = paths(BackendKind::Local);
        let rendered = render(&request(&resources, &paths));

        assert_eq!(
            rendered.submission,
            "#!/bin/bash

module load samtools
module load python/3.11
cd /work
date +'%d-%H:%M:%S'
echo \"Running sample\"
(
echo hi
)
exitcode=$?
echo Done
date +'%d-%H:%M:%S'
if [[ $exitcode != 0 ]]; then
    echo Exited with code: $exitcode >&2
fi
exit $exitcode"
        );
        assert!(!rendered.submission.contains("#SBATCH"));
        assert!(!rendered.submission.contains("#PBS"));
    }
}
